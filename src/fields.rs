//! Enumerations and field types for the chore board.
//!
//! This module defines the structured data types used to categorise and schedule
//! chores: the room/area category and the recurrence frequency. Both serialize
//! as upper-case string tags in storage and import/export payloads, and decoding
//! rejects unknown tags rather than silently accepting them.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Where in the home a chore happens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Kitchen,
    Living,
    Bedrooms,
    Bathrooms,
    Entry,
    Outdoor,
    General,
    Admin,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 8] = [
        Category::Kitchen,
        Category::Living,
        Category::Bedrooms,
        Category::Bathrooms,
        Category::Entry,
        Category::Outdoor,
        Category::General,
        Category::Admin,
    ];
}

/// How often a chore recurs. Immutable once a task is created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// All frequency buckets, in board-view order (Day .. Year).
    pub const ALL: [Frequency; 5] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Annual,
    ];
}
