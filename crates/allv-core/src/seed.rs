//! Reproducible demo data.
//!
//! The generator is an explicit value, never global state: two seeders built
//! from the same seed and anchor instant produce the same names, titles, and
//! timestamps.

use crate::error::Result;
use crate::store::Directory;
use crate::types::{Post, User};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

const LCG_MULTIPLIER: u64 = 1_664_525;
const LCG_INCREMENT: u64 = 1_013_904_223;
const LCG_MODULUS: u64 = 0xffff_ffff;

pub const DEFAULT_SEED: u64 = 42;

pub const DEMO_NAMES: [&str; 10] = [
    "Alex Chen",
    "Priya Singh",
    "Liam O'Connor",
    "Maya Rodríguez",
    "Samir Patel",
    "Elena Petrova",
    "Noah Johnson",
    "Aisha Khan",
    "Jonas Müller",
    "Sofia Rossi",
];

const SAMPLE_TITLES: [&str; 10] = [
    "Hello world",
    "Today I learned…",
    "Quick tip for axum",
    "Why I love SQLite",
    "Handlers FTW",
    "Type safety matters",
    "Debugging charts",
    "serde vs hand parsing",
    "Tracing tricks",
    "Refactor notes",
];

const SAMPLE_BODIES: [&str; 5] = [
    "Short note about my setup and a couple of gotchas.",
    "Sharing a tiny snippet that saved me time.",
    "Writing down what broke and how I fixed it for future me.",
    "Some thoughts on developer experience and trade-offs.",
    "Leaving this here so I don't forget tomorrow.",
];

/// Linear congruential generator over `[0, 1)`.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % LCG_MODULUS,
        }
    }

    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.state as f64 / LCG_MODULUS as f64
    }

    /// Uniform integer in `min..=max`.
    pub fn int_between(&mut self, min: u32, max: u32) -> u32 {
        debug_assert!(min <= max);
        let span = f64::from(max - min + 1);
        (self.next_f64() * span).floor() as u32 + min
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        let last = items.len().saturating_sub(1) as u32;
        items[self.int_between(0, last) as usize]
    }
}

impl Default for SeededRng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// `"Liam O'Connor"` -> `"liam.o.connor@example.com"`.
pub fn demo_email(name: &str) -> String {
    static NON_ALPHA: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALPHA.get_or_init(|| Regex::new("[^a-z]+").expect("pattern is valid"));
    format!("{}@example.com", re.replace_all(&name.to_lowercase(), "."))
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub posts: usize,
}

/// Fills a [`Directory`] with demo users and posts relative to an anchor instant.
pub struct DemoSeeder {
    rng: SeededRng,
    anchor: DateTime<Utc>,
    users: usize,
}

impl DemoSeeder {
    pub fn new(seed: u64, anchor: DateTime<Utc>) -> Self {
        Self {
            rng: SeededRng::new(seed),
            anchor,
            users: DEMO_NAMES.len(),
        }
    }

    /// Limit how many demo names are used.
    pub fn with_users(mut self, users: usize) -> Self {
        self.users = users.min(DEMO_NAMES.len());
        self
    }

    /// A jittered instant `days` calendar days before the anchor, between
    /// 08:00 and 22:59:59 UTC.
    fn days_ago(&mut self, days: u32) -> DateTime<Utc> {
        let hour = self.rng.int_between(8, 22);
        let minute = self.rng.int_between(0, 59);
        let second = self.rng.int_between(0, 59);
        let date = self.anchor.date_naive() - Duration::days(i64::from(days));
        let time = NaiveTime::from_hms_opt(hour, minute, second).unwrap_or(NaiveTime::MIN);
        date.and_time(time).and_utc()
    }

    /// Replace the directory contents with freshly generated demo data.
    pub fn seed(&mut self, directory: &mut Directory) -> Result<SeedSummary> {
        tracing::info!(users = self.users, anchor = %self.anchor, "Seeding demo data");
        directory.clear()?;

        let mut posts = 0;
        for name in DEMO_NAMES.iter().take(self.users) {
            let offset = self.rng.int_between(20, 120);
            let created_at = self.days_ago(offset);
            let user = User::created_at(*name, demo_email(name), created_at);
            let user_id = user.id.clone();
            directory.insert_user(user);

            let post_count = self.rng.int_between(2, 10);
            for _ in 0..post_count {
                let day = self.rng.int_between(0, 30);
                let title = self.rng.pick(&SAMPLE_TITLES);
                let body = self.rng.pick(&SAMPLE_BODIES);
                let created_at = self.days_ago(day);
                directory.insert_post(Post::created_at(&user_id, title, body, created_at))?;
                posts += 1;
            }
        }

        directory.save()?;
        let summary = SeedSummary {
            users: self.users,
            posts,
        };
        tracing::info!(users = summary.users, posts = summary.posts, "Seeding complete");
        Ok(summary)
    }
}
