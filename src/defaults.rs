//! Built-in default dataset and activity library.
//!
//! The default users and starter tasks are used whenever no board file exists,
//! the persisted file cannot be parsed, or the user asks for a full reset.

use chrono::{DateTime, Local};

use crate::board::Board;
use crate::fields::{Category, Frequency};
use crate::task::{LibraryTask, Task, User};

/// The two starter household members.
pub fn default_users() -> Vec<User> {
    vec![
        User {
            id: "user1".to_string(),
            name: "Alex".to_string(),
            color: "#0EA5E9".to_string(),
            avatar: "🦊".to_string(),
        },
        User {
            id: "user2".to_string(),
            name: "Sam".to_string(),
            color: "#D946EF".to_string(),
            avatar: "🐼".to_string(),
        },
    ]
}

/// Starter tasks spanning every frequency bucket.
pub fn default_tasks(now: DateTime<Local>) -> Vec<Task> {
    let seed = [
        ("Do the dishes", Category::Kitchen, Frequency::Daily, vec!["user1"]),
        ("Wipe kitchen counters", Category::Kitchen, Frequency::Daily, vec!["user2"]),
        ("Take out the bins", Category::Entry, Frequency::Weekly, vec!["user1"]),
        ("Vacuum living room", Category::Living, Frequency::Weekly, vec!["user2"]),
        ("Change bed sheets", Category::Bedrooms, Frequency::Weekly, vec!["user1", "user2"]),
        ("Scrub the shower", Category::Bathrooms, Frequency::Monthly, vec!["user2"]),
        ("Descale the kettle", Category::Kitchen, Frequency::Monthly, vec!["user1"]),
        ("Clean the windows", Category::General, Frequency::Quarterly, vec!["user1", "user2"]),
        ("Clear out the gutters", Category::Outdoor, Frequency::Quarterly, vec!["user1"]),
        ("Review insurance policies", Category::Admin, Frequency::Annual, vec!["user2"]),
        ("Deep-clean the oven", Category::Kitchen, Frequency::Annual, vec!["user1"]),
    ];

    seed.iter()
        .enumerate()
        .map(|(i, (title, category, frequency, assignees))| Task {
            id: (i + 1) as u64,
            title: title.to_string(),
            description: None,
            category: *category,
            frequency: *frequency,
            assigned_to: assignees.iter().map(|s| s.to_string()).collect(),
            completed_by: Vec::new(),
            is_sos: false,
            due_date: now,
            is_done: false,
            completed_at: None,
            last_reset_at: now,
        })
        .collect()
}

/// A fresh board with the built-in dataset.
pub fn default_board(now: DateTime<Local>) -> Board {
    Board {
        tasks: default_tasks(now),
        users: default_users(),
        lang: "en".to_string(),
    }
}

/// The built-in activity library: common chores with a suggested cadence.
pub fn task_library() -> Vec<LibraryTask> {
    let seed = [
        ("dishes", "Do the dishes", Category::Kitchen, Frequency::Daily),
        ("counters", "Wipe kitchen counters", Category::Kitchen, Frequency::Daily),
        ("fridge", "Clean out the fridge", Category::Kitchen, Frequency::Monthly),
        ("oven", "Deep-clean the oven", Category::Kitchen, Frequency::Annual),
        ("vacuum-living", "Vacuum living room", Category::Living, Frequency::Weekly),
        ("dust-shelves", "Dust the shelves", Category::Living, Frequency::Weekly),
        ("sofa-covers", "Wash sofa covers", Category::Living, Frequency::Quarterly),
        ("bed-sheets", "Change bed sheets", Category::Bedrooms, Frequency::Weekly),
        ("wardrobe", "Sort the wardrobe", Category::Bedrooms, Frequency::Quarterly),
        ("toilet", "Clean the toilet", Category::Bathrooms, Frequency::Weekly),
        ("shower", "Scrub the shower", Category::Bathrooms, Frequency::Monthly),
        ("towels", "Swap the towels", Category::Bathrooms, Frequency::Weekly),
        ("bins", "Take out the bins", Category::Entry, Frequency::Weekly),
        ("doormat", "Shake out the doormat", Category::Entry, Frequency::Monthly),
        ("lawn", "Mow the lawn", Category::Outdoor, Frequency::Weekly),
        ("gutters", "Clear out the gutters", Category::Outdoor, Frequency::Quarterly),
        ("windows", "Clean the windows", Category::General, Frequency::Quarterly),
        ("smoke-alarms", "Test the smoke alarms", Category::General, Frequency::Quarterly),
        ("bills", "Pay the bills", Category::Admin, Frequency::Monthly),
        ("insurance", "Review insurance policies", Category::Admin, Frequency::Annual),
    ];

    seed.iter()
        .map(|(id, title, category, frequency)| LibraryTask {
            id: id.to_string(),
            title: title.to_string(),
            category: *category,
            suggested_frequency: *frequency,
        })
        .collect()
}

/// Look up a library entry by its id or (case-insensitive) title.
pub fn find_library_task(query: &str) -> Option<LibraryTask> {
    let lowered = query.to_lowercase();
    task_library()
        .into_iter()
        .find(|item| item.id == lowered || item.title.to_lowercase() == lowered)
}
