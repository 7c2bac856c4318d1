use anyhow::Result;
use console::{Term, style};
use heliumctl_browser::user_data_roots;
use heliumctl_core::{TtlCache, time};
use heliumctl_store::{BookmarkItem, Mutator, StoreHandle, StoreKind, candidates, locate};
use std::collections::BTreeSet;
use std::path::PathBuf;

pub fn search(query: Option<String>, json: bool, user_data_dir: Option<PathBuf>) -> Result<()> {
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
                let items = mutator.load_bookmarks(&handle).await?;
                let matches: Vec<_> = items.into_iter().filter(|i| i.matches(&query)).collect();
                print_results(&matches, json)
            }
            None => interactive(&mutator, &handle).await,
        }
    })
}

pub fn delete(ids: Vec<String>, no_verify: bool, user_data_dir: Option<PathBuf>) -> Result<()> {
    let Some(handle) = resolve(user_data_dir) else {
        return Ok(());
    };
    let ids: BTreeSet<String> = ids.into_iter().collect();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mutator = Mutator::new().with_verification(!no_verify);
    let outcome = runtime.block_on(mutator.delete_bookmarks(&handle, &ids))?;

    println!("{}", super::outcome_summary(outcome, "bookmark", "bookmarks"));
    println!("   Reopen the bookmark manager to see the change");
    Ok(())
}

/// Freshly resolve the bookmarks file. Absence is a normal outcome and is
/// reported as guidance, not as a failure.
fn resolve(user_data_dir: Option<PathBuf>) -> Option<StoreHandle> {
    let roots = user_data_roots(user_data_dir);
    match locate(&roots, StoreKind::Bookmarks) {
        Some(handle) => {
            tracing::debug!("bookmarks file at {}", handle.path.display());
            Some(handle)
        }
        None => {
            println!("Bookmarks file not found - has Helium been launched yet?");
            for path in candidates(&roots, StoreKind::Bookmarks).iter().take(3) {
                println!("  checked {}", path.display());
            }
            None
        }
    }
}

/// Prompt loop for repeated searches. The parsed store is cached for the
/// TTL window so every keystroke-ish query does not re-read the file, and
/// the cache is dropped the moment a deletion goes through.
async fn interactive(mutator: &Mutator, handle: &StoreHandle) -> Result<()> {
    let term = Term::stdout();
    let mut cache: TtlCache<Vec<BookmarkItem>> = TtlCache::default();

    println!("Type to search bookmarks; `rm <id>...` deletes; empty line exits.");
    loop {
        term.write_str("search> ")?;
        let line = term.read_line()?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        if let Some(rest) = line.strip_prefix("rm ") {
            let ids: BTreeSet<String> = rest.split_whitespace().map(str::to_string).collect();
            match mutator.delete_bookmarks(handle, &ids).await {
                Ok(outcome) => {
                    cache.invalidate();
                    println!("{}", super::outcome_summary(outcome, "bookmark", "bookmarks"));
                }
                Err(err) => println!("{}", style(err).red()),
            }
            continue;
        }

        let items = match cache.get() {
            Some(items) => items.clone(),
            None => {
                let loaded = mutator.load_bookmarks(handle).await?;
                cache.put(loaded.clone());
                loaded
            }
        };
        let matches: Vec<_> = items.into_iter().filter(|i| i.matches(line)).collect();
        print_results(&matches, false)?;
    }
    Ok(())
}

fn print_results(items: &[BookmarkItem], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No bookmarks found");
        return Ok(());
    }

    let now = chrono::Utc::now();
    for item in items {
        let target = if item.is_folder {
            style("[folder]".to_string()).yellow()
        } else {
            style(item.url.clone().unwrap_or_default()).blue()
        };
        let added = if item.date_added > 0 {
            time::format_relative(item.date_added_utc(), now)
        } else {
            String::new()
        };
        println!(
            "{:>8}  {}  {}  {}  {}",
            style(&item.id).dim(),
            item.name,
            target,
            style(&item.folder_path).dim(),
            style(added).dim()
        );
    }
    println!("{} item(s)", items.len());
    Ok(())
}
