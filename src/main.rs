use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::{
    env,
    error::Error,
    io::BufRead,
    sync::atomic::{AtomicBool, Ordering},
    sync::Arc,
    thread,
};
use mis_td::{
    driver::solve,
    graph::{Decomposition, Graph},
    search::Mode,
};

/// Read a graph in PACE2020 format from stdin.
///
/// *Errors:*
/// - missing, duplicate, or incomplete p-line, an edge before the p-line,
///   malformed tokens, vertex ids outside 1..n, self-loops, or a number of
///   edge lines that does not match m.
///
fn read_graph() -> Result<Graph, Box<dyn Error>> {
    let mut g: Option<Graph> = None;
    let mut m = 0;
    let mut edges_read = 0;
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let ll: Vec<&str> = line.split(" ").collect();
        match ll[0] {
            "c" => {}                                 // skip comments
            "p" => {                                  // p-line: "p <format> <n> <m>"
                if g.is_some() {
                    return Err(From::from("c Found a second p-line. Abort!"));
                }
                if ll.len() < 4 {
                    return Err(From::from("c Incomplete p-line. Abort!"));
                }
                let n = ll[2].parse::<usize>()?;
                m = ll[3].parse::<usize>()?;
                g = Some(Graph::new(n));
            }
            _ => {                                    // edge line
                match g {
                    None => {
                        return Err(From::from("c Found edge before p-line. Abort!"));
                    }
                    Some(ref mut g) => {
                        if ll.len() != 2 {
                            return Err(From::from("c Malformed edge line. Abort!"));
                        }
                        let u = ll[0].parse::<usize>()?;
                        let v = ll[1].parse::<usize>()?;
                        if u < 1 || u > g.n || v < 1 || v > g.n {
                            return Err(From::from("c Edge endpoint out of range. Abort!"));
                        }
                        if u == v {
                            return Err(From::from("c Self-loop in input. Abort!"));
                        }
                        g.add_edge(u - 1, v - 1);
                        edges_read += 1;
                    }
                }
            }
        }
    }
    match g {
        Some(g) if edges_read == m => Ok(g),
        Some(_) => Err(From::from("c Number of edge lines does not match m. Abort!")),
        None => Err(From::from("c Failed to parse input! Maybe it was empty?")),
    }
}

/// Print the treedepth and the elimination forest in PACE2020 format:
/// the depth on the first line, then one parent per vertex, 0 for roots.
///
fn print_elimination_forest(td: usize, dec: &Decomposition) {
    println!("{}", td);
    for v in 0..dec.parent.len() {
        match dec.parent[v] {
            Some(p) => println!("{}", p + 1),
            None    => println!("0")
        };
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let g = match read_graph() {
        Ok(g)  => g,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // The deadline signal only sets a flag; the search polls it and unwinds
    // cooperatively, keeping the best completed result.
    let abort = Arc::new(AtomicBool::new(false));
    let mut signals = Signals::new(&[SIGINT, SIGTERM])?; // SIGINT helps to test via CTRL-C
    let flag = abort.clone();
    thread::spawn(move || {
        for sig in signals.forever() {
            flag.store(true, Ordering::Relaxed);
            eprintln!("c Received signal {:?}", sig);
        }
    });

    let mode = if env::args().any(|a| a == "--heuristic") {
        Mode::Heuristic
    } else {
        Mode::Exact
    };

    match solve(&g, mode, &abort, &mut rand::thread_rng()) {
        Ok((td, dec)) => print_elimination_forest(td, &dec),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}
