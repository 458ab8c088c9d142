use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use haru_core::{Compilation, Compiler, Event, MemoryState, Outcome};
use tracing::{debug, info, warn};

use crate::config::HaruConfig;
use crate::render::{render_compilation, render_error};
use crate::store::{Store, StoredEvent};

pub fn run(config: &HaruConfig, store: &Store, text: &str, verbose: bool) -> Result<()> {
    let compiler = Compiler::new(config.planner.clone());
    let now = Local::now().naive_local();

    if let Some(lines) = handle(&compiler, store, text, now, verbose)? {
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}

/// Compile one utterance against the store and persist the result.
///
/// Returns the lines to show, or `None` after printing a clarification
/// request for input the compiler refused.
pub fn handle(
    compiler: &Compiler,
    store: &Store,
    text: &str,
    now: NaiveDateTime,
    verbose: bool,
) -> Result<Option<Vec<String>>> {
    let memory = store.memory()?;
    let snapshot = store.events()?;
    let existing: Vec<Event> = snapshot.iter().map(|s| s.event.clone()).collect();

    let compilation = match compiler.compile(text, now, &memory, &existing) {
        Ok(compilation) => compilation,
        Err(e) => {
            if e.needs_clarification() {
                debug!(error = %e, "asking for clarification");
            } else {
                warn!(error = %e, "compile failed");
            }
            println!("{}", render_error(&e));
            return Ok(None);
        }
    };

    persist(store, &snapshot, &memory, &compilation)?;
    Ok(Some(render_compilation(&compilation, verbose)))
}

fn persist(
    store: &Store,
    snapshot: &[StoredEvent],
    memory: &MemoryState,
    compilation: &Compilation,
) -> Result<()> {
    if let Outcome::Scheduled { upsert, .. } = &compilation.outcome
        && !upsert.report.is_empty()
    {
        let touched = store.apply(snapshot, upsert)?;
        info!(count = touched.len(), "stored events");
    }

    if compilation.proposed_memory != *memory {
        store.save_memory(&compilation.proposed_memory)?;
        debug!("memory updated");
    }
    Ok(())
}
