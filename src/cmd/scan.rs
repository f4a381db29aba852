use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::error::AppResult;
use crate::fence::extract_ticket_keys;
use crate::inline::find_inline_matches;
use crate::inline::matcher::decoration_kind;
use crate::workflow::note::find_ticket_fences;

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Markdown note to scan.
    pub file: PathBuf,
    /// Cursor byte offset used to pick mark or widget.
    #[arg(long, default_value_t = 0)]
    pub cursor: usize,
    /// Treat the note as shown in the source editor.
    #[arg(long)]
    pub source_mode: bool,
}

/// Lists ticket references without touching the network.
pub fn run(args: ScanArgs) -> AppResult<()> {
    let text = fs::read_to_string(&args.file)?;
    let fences = find_ticket_fences(&text);

    for fence in &fences {
        let keys = extract_ticket_keys(&fence.body);
        println!(
            "block {}..{}: {}",
            fence.range.start,
            fence.range.end,
            if keys.is_empty() {
                "<no valid issues>".to_string()
            } else {
                keys.join(", ")
            }
        );
    }

    for found in find_inline_matches(&text) {
        let inside_fence = fences
            .iter()
            .any(|fence| fence.range.contains(&found.range.start));
        if inside_fence {
            continue;
        }
        let kind = decoration_kind(&found.range, args.cursor, !args.source_mode);
        println!(
            "inline {}..{}\t{}\t{:?}{}",
            found.range.start,
            found.range.end,
            found.key,
            kind,
            if found.compact { " (compact)" } else { "" }
        );
    }

    Ok(())
}
