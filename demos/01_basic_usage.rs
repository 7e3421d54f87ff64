//! Demo 01: Basic Usage
//!
//! Adds, completes, edits, filters and deletes tasks in a file-backed store,
//! then reopens the store to show the tasks were saved.
//!
//! Run with: cargo run --example 01_basic_usage

use eyre::Result;
use tasklist::render;
use tasklist::{FileStore, Filter, Priority, TaskDetails, TaskStore};

fn main() -> Result<()> {
    // Create a temporary directory for this demo
    let temp_dir = tempfile::tempdir()?;
    let data_dir = temp_dir.path().to_path_buf();

    println!("tasklist Basic Usage Demo");
    println!("=========================\n");
    println!("Data dir: {}\n", data_dir.display());

    let mut store = TaskStore::open(FileStore::open(&data_dir)?)?;

    // ADD
    println!("1. ADD - Adding three tasks...");
    let milk = store.add("Buy milk")?.expect("non-empty text");
    let report = store.add("Write report")?.expect("non-empty text");
    let dentist = store
        .add_with_details(
            TaskDetails::new("Dentist")
                .with_priority(Priority::High)
                .with_category("personal")
                .with_due_date(chrono::NaiveDate::from_ymd_opt(2025, 1, 5)),
        )?
        .expect("non-empty text");
    assert_eq!(store.add("   ")?, None);
    println!("   Blank input was ignored");
    println!("   {}\n", render::stats_line(&store.stats()));

    // TOGGLE
    println!("2. TOGGLE - Completing 'Buy milk'...");
    let toggle = store.toggle_complete(milk)?.expect("task exists");
    if toggle.first_completion {
        println!("   {}", render::celebration(false));
    }
    println!("   {}\n", render::progress_bar(&store.stats(), 20));

    // EDIT
    println!("3. EDIT - Renaming 'Write report'...");
    let details = store.get(report).expect("task exists").details();
    store.edit(report, TaskDetails {
        text: "Write quarterly report".to_string(),
        ..details
    })?;
    println!("   Now: {}\n", store.get(report).expect("task exists").text);

    // FILTER
    for filter in Filter::ALL {
        println!("4. FILTER - {}:", filter);
        for line in render::list(&store, filter, false) {
            println!("   {}", line);
        }
        println!();
    }

    // DELETE
    println!("5. DELETE - Removing 'Dentist'...");
    store.delete(dentist)?;
    println!("   {}\n", render::stats_line(&store.stats()));

    // REOPEN
    drop(store);
    println!("6. REOPEN - Loading saved tasks...");
    let store = TaskStore::open(FileStore::open(&data_dir)?)?;
    for line in render::list(&store, Filter::All, false) {
        println!("   {}", line);
    }

    println!("\nDemo complete!");
    Ok(())
}
