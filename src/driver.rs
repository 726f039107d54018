use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use rand::Rng;
use crate::graph::{Decomposition, Graph};
use crate::search::{Mode, SearchContext};

/// Drive the search on the given graph and return the treedepth together
/// with a witnessing elimination forest.
///
/// In `Exact` mode a single exhaustive search runs to completion (seeded
/// with one greedy pass for a first bound). In `Heuristic` mode the greedy
/// search restarts with reshuffled candidate orders until the abort flag
/// fires, so a host must always supply a deadline signal.
///
/// *Errors:*
/// - if the abort flag fires before any search completes there is no
///   decomposition to report; this is surfaced as an error rather than
///   printed as if it were a valid answer.
///
pub fn solve<R: Rng>(
    g: &Graph,
    mode: Mode,
    abort: &Arc<AtomicBool>,
    rng: &mut R,
) -> Result<(usize, Decomposition), Box<dyn Error>> {
    if g.n == 0 {
        return Ok((0, Decomposition::new(0)));
    }

    let mut ctx = SearchContext::new(g.n, abort.clone());
    match mode {
        Mode::Exact => {
            // one cheap greedy pass seeds the bound for the exhaustive run
            ctx.run(g, Mode::Heuristic);
            if ctx.best_depth <= g.n {
                eprintln!("c greedy bound {}", ctx.best_depth + 1);
            }
            ctx.run(g, Mode::Exact);
        }
        Mode::Heuristic => {
            let mut reported = g.n + 1;
            loop {
                ctx.run(g, Mode::Heuristic);
                if ctx.best_depth < reported {
                    reported = ctx.best_depth;
                    eprintln!("c improved to {}", reported + 1);
                }
                if abort.load(Ordering::Relaxed) {
                    break;
                }
                ctx.shuffle_order(rng);
            }
        }
    }

    match ctx.best_decomposition() {
        Some(result) => Ok(result),
        None => Err(From::from("c Interrupted before any decomposition was completed. Abort!")),
    }
}
