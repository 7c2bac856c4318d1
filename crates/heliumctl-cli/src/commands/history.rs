use anyhow::Result;
use console::{Term, style};
use heliumctl_browser::user_data_roots;
use heliumctl_core::{TtlCache, time};
use heliumctl_store::{HistoryEntry, Mutator, StoreHandle, StoreKind, candidates, locate};
use heliumctl_store::history::DEFAULT_QUERY_LIMIT;
use std::path::PathBuf;

pub fn search(
    query: Option<String>,
    json: bool,
    limit: usize,
    user_data_dir: Option<PathBuf>,
) -> Result<()> {
    let Some(handle) = resolve(user_data_dir) else {
        return Ok(());
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mutator = Mutator::new();
        match query {
            Some(query) => {
                let entries = mutator.load_history(&handle, DEFAULT_QUERY_LIMIT).await?;
                let matches: Vec<_> = entries
                    .into_iter()
                    .filter(|e| e.matches(&query))
                    .take(limit)
                    .collect();
                print_results(&matches, json)
            }
            None => interactive(&mutator, &handle, limit).await,
        }
    })
}

pub fn delete(ids: Vec<i64>, user_data_dir: Option<PathBuf>) -> Result<()> {
    let Some(handle) = resolve(user_data_dir) else {
        return Ok(());
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mutator = Mutator::new();
    let outcome = runtime.block_on(mutator.delete_history(&handle, &ids))?;

    println!(
        "{}",
        super::outcome_summary(outcome, "history entry", "history entries")
    );
    Ok(())
}

fn resolve(user_data_dir: Option<PathBuf>) -> Option<StoreHandle> {
    let roots = user_data_roots(user_data_dir);
    match locate(&roots, StoreKind::History) {
        Some(handle) => {
            tracing::debug!("history database at {}", handle.path.display());
            Some(handle)
        }
        None => {
            println!("History database not found - has Helium been launched yet?");
            for path in candidates(&roots, StoreKind::History).iter().take(3) {
                println!("  checked {}", path.display());
            }
            None
        }
    }
}

async fn interactive(mutator: &Mutator, handle: &StoreHandle, limit: usize) -> Result<()> {
    let term = Term::stdout();
    let mut cache: TtlCache<Vec<HistoryEntry>> = TtlCache::default();

    println!("Type to search history; `rm <id>...` deletes; empty line exits.");
    loop {
        term.write_str("search> ")?;
        let line = term.read_line()?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        if let Some(rest) = line.strip_prefix("rm ") {
            let ids: Vec<i64> = rest
                .split_whitespace()
                .filter_map(|word| word.parse().ok())
                .collect();
            if ids.is_empty() {
                println!("Usage: rm <numeric id>...");
                continue;
            }
            match mutator.delete_history(handle, &ids).await {
                Ok(outcome) => {
                    cache.invalidate();
                    println!(
                        "{}",
                        super::outcome_summary(outcome, "history entry", "history entries")
                    );
                }
                Err(err) => println!("{}", style(err).red()),
            }
            continue;
        }

        let entries = match cache.get() {
            Some(entries) => entries.clone(),
            None => {
                let loaded = mutator.load_history(handle, DEFAULT_QUERY_LIMIT).await?;
                cache.put(loaded.clone());
                loaded
            }
        };
        let matches: Vec<_> = entries
            .into_iter()
            .filter(|e| e.matches(line))
            .take(limit)
            .collect();
        print_results(&matches, false)?;
    }
    Ok(())
}

fn print_results(entries: &[HistoryEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No history entries found");
        return Ok(());
    }

    let now = chrono::Utc::now();
    for entry in entries {
        println!(
            "{:>8}  {}  {}  {}  {}",
            style(entry.id).dim(),
            entry.title,
            style(&entry.url).blue(),
            style(format!("{} visit(s)", entry.visit_count)).dim(),
            style(time::format_relative(entry.last_visit_utc(), now)).dim()
        );
    }
    println!("{} entry(ies)", entries.len());
    Ok(())
}
