//! Demo 02: Observers and Confirmation
//!
//! Shows how a front end subscribes to store events instead of re-rendering
//! inside every mutation, and how `clear_all` asks for confirmation.
//!
//! Run with: cargo run --example 02_observers

use eyre::Result;
use std::cell::RefCell;
use std::rc::Rc;
use tasklist::{MemoryStore, StoreEvent, TaskStore, Theme, ThemeStore};

fn main() -> Result<()> {
    println!("tasklist Observers Demo");
    println!("=======================\n");

    let mut store = TaskStore::open(MemoryStore::new())?;

    // A stand-in for a rendering layer: it just records what happened
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    store.subscribe(move |event: &StoreEvent| {
        let line = match event {
            StoreEvent::Added(id) => format!("added {}", id),
            StoreEvent::Toggled { id, toggle } if toggle.first_completion => {
                format!("completed {} (first one, celebrate!)", id)
            }
            StoreEvent::Toggled { id, toggle } => format!("toggled {} -> {}", id, toggle.completed),
            StoreEvent::Edited(id) => format!("edited {}", id),
            StoreEvent::Deleted(id) => format!("deleted {}", id),
            StoreEvent::Cleared { removed } => format!("cleared {} tasks", removed),
        };
        sink.borrow_mut().push(line);
    });

    let a = store.add("Water plants")?.expect("non-empty text");
    let b = store.add("Call mom")?.expect("non-empty text");
    store.toggle_complete(b)?;
    store.toggle_complete(a)?;

    // Declined confirmation leaves everything in place
    let cleared = store.clear_all(&mut |msg: &str| {
        println!("prompt: {} -> no", msg);
        false
    })?;
    println!("cleared: {} (still {} tasks)\n", cleared, store.len());

    store.clear_all(&mut true)?;

    println!("Events:");
    for line in log.borrow().iter() {
        println!("   {}", line);
    }

    // Theme preference lives under its own key
    let mut themes = ThemeStore::new(store.into_inner());
    println!("\nTheme (system prefers dark): {}", themes.resolve(true)?);
    themes.set(Theme::Light)?;
    println!("Theme after choosing light: {}", themes.resolve(true)?);

    Ok(())
}
