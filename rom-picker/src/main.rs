use anyhow::{Context, Result, bail};
use rom_browser::{
    Browser, BrowserConfig, BrowserEvent, ScanProgress, StdFileSystem, Transition,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;

const ROOT_ENV: &str = "ROM_PICKER_ROOT";
const DEFAULT_ROWS: usize = 12;

struct Args {
    config: BrowserConfig,
    rows: usize,
}

fn usage() -> String {
    format!(
        "Usage: rom-picker [--root <dir>] [--rows <n>] [--ext <list>]\n\
         \n\
         Root defaults to ${ROOT_ENV}, then {}.\n\
         Commands (one per line): j/k move, <n> select, enter open,\n\
         u parent, r rescan, q quit",
        rom_browser::DEFAULT_ROOT
    )
}

fn parse_args() -> Result<Option<Args>> {
    let mut config = BrowserConfig::default();
    if let Ok(root) = std::env::var(ROOT_ENV) {
        config = config.root(root);
    }
    let mut rows = DEFAULT_ROWS;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--root" => {
                let v = args.next().context("--root needs a directory")?;
                config = config.root(PathBuf::from(v));
            }
            "--rows" => {
                let v = args.next().context("--rows needs a number")?;
                rows = v
                    .parse()
                    .with_context(|| format!("invalid row count: {v}"))?;
                if rows == 0 {
                    bail!("--rows must be at least 1");
                }
            }
            "--ext" => {
                let v = args.next().context("--ext needs a comma separated list")?;
                config = config.extensions(v.split(','));
            }
            "-h" | "--help" => {
                eprintln!("{}", usage());
                return Ok(None);
            }
            other => bail!("unknown argument: {other}\n{}", usage()),
        }
    }
    Ok(Some(Args { config, rows }))
}

/// Scrolling window over the listing; keeps the selection visible.
struct Window {
    top: usize,
    rows: usize,
}

impl Window {
    fn follow(&mut self, selected: usize, len: usize) {
        if selected < self.top {
            self.top = selected;
        } else if selected >= self.top.saturating_add(self.rows) {
            self.top = selected + 1 - self.rows;
        }
        self.top = self.top.min(len.saturating_sub(self.rows));
    }

    fn render(&mut self, browser: &Browser<StdFileSystem>, out: &mut impl Write) -> Result<()> {
        let listing = browser.listing();
        self.follow(browser.selected(), listing.len());

        writeln!(out, "-- {} --", browser.cwd().display())?;
        let end = self.top.saturating_add(self.rows).min(listing.len());
        for (i, entry) in listing.iter().enumerate().take(end).skip(self.top) {
            let cursor = if i == browser.selected() { '>' } else { ' ' };
            writeln!(out, "{cursor} {i:>3} {}", entry.label())?;
        }
        if end < listing.len() {
            writeln!(out, "      ... {} more", listing.len() - end)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Range of objects about to be scanned, e.g. "Scanning 51-100...".
fn scan_range(p: ScanProgress, interval: usize) -> String {
    format!(
        "Scanning {}-{}...",
        p.scanned.saturating_add(1),
        p.scanned.saturating_add(interval)
    )
}

fn parse_command(line: &str) -> Option<BrowserEvent> {
    match line.trim() {
        "" | "o" | "enter" => Some(BrowserEvent::Activate),
        "j" | "down" => Some(BrowserEvent::MoveSelection(1)),
        "k" | "up" => Some(BrowserEvent::MoveSelection(-1)),
        "J" | "pgdn" => Some(BrowserEvent::MoveSelection(DEFAULT_ROWS as isize)),
        "K" | "pgup" => Some(BrowserEvent::MoveSelection(-(DEFAULT_ROWS as isize))),
        "u" | "back" => Some(BrowserEvent::NavigateUp),
        "r" | "rescan" => Some(BrowserEvent::Rescan),
        n => n.parse().ok().map(BrowserEvent::Select),
    }
}

fn run() -> Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };
    rom_browser::logging::init_tracing();

    let root = args.config.root.clone();
    let mut browser: Browser<StdFileSystem> = Browser::open(StdFileSystem, args.config)
        .with_context(|| format!("open rom browser at {}", root.display()))?;
    let interval = browser.config().progress_interval;
    browser.set_progress_callback(move |p| eprintln!("{}", scan_range(p, interval)));

    let mut window = Window {
        top: 0,
        rows: args.rows,
    };
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    window.render(&browser, &mut out)?;

    for line in stdin.lock().lines() {
        let line = line.context("read command from stdin")?;
        if matches!(line.trim(), "q" | "quit") {
            break;
        }
        let Some(ev) = parse_command(&line) else {
            eprintln!("unknown command: {}", line.trim());
            continue;
        };
        match browser.apply_event(ev) {
            Transition::Launch(path) => {
                tracing::info!(path = %path.display(), "rom picked");
                writeln!(out, "{}", path.display())?;
                return Ok(());
            }
            Transition::Ignored => {}
            Transition::Rescanned => {
                if let Some(report) = browser.last_scan() {
                    eprintln!(
                        "Scanned {} objects, kept {}, dropped {}",
                        report.scanned, report.retained, report.dropped
                    );
                }
                window.render(&browser, &mut out)?;
            }
            Transition::SelectionMoved | Transition::DirectoryChanged => {
                window.render(&browser, &mut out)?;
            }
        }
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("rom-picker: {err:#}");
        std::process::exit(1);
    }
}
