use anyhow::Result;
use chrono::Local;

use crate::render::render_event_list;
use crate::store::Store;

pub fn run(store: &Store, limit: Option<usize>) -> Result<()> {
    let mut events = store.sorted_events()?;
    let total = events.len();
    if let Some(limit) = limit {
        events.truncate(limit);
    }

    let today = Local::now().date_naive();
    for line in render_event_list(&events, today) {
        println!("{line}");
    }

    if events.len() < total {
        println!("\n... and {} more", total - events.len());
    }
    Ok(())
}
