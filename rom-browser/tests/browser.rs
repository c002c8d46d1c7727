use std::cell::{Cell, RefCell};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rom_browser::index_cache;
use rom_browser::last_visited;
use rom_browser::{
    ActionTrigger, Browser, BrowserConfig, BrowserError, BrowserEvent, DirIter, Entry,
    FileSystem, Sandbox, StdFileSystem, Transition,
};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    p.push(format!("rom-browser-{prefix}-{pid}-{t}"));
    let _ = std::fs::remove_dir_all(&p);
    p
}

fn touch(path: &Path) {
    std::fs::write(path, b"").unwrap();
}

/// Root with `GAMES/`, `DEMOS/`, `a.gb`, `B.GBC` and `readme.txt`.
fn sample_root(prefix: &str) -> PathBuf {
    let root = unique_temp_dir(prefix);
    std::fs::create_dir_all(root.join("GAMES")).unwrap();
    std::fs::create_dir_all(root.join("DEMOS")).unwrap();
    touch(&root.join("a.gb"));
    touch(&root.join("B.GBC"));
    touch(&root.join("readme.txt"));
    root
}

fn open(root: &Path) -> Browser<StdFileSystem> {
    Browser::open(StdFileSystem, BrowserConfig::new(root)).unwrap()
}

fn labels<F: FileSystem, const N: usize>(b: &Browser<F, N>) -> Vec<String> {
    b.listing().iter().map(Entry::label).collect()
}

fn position(b: &Browser<impl FileSystem>, label: &str) -> usize {
    b.listing()
        .iter()
        .position(|e| e.label() == label)
        .unwrap_or_else(|| panic!("{label} not listed"))
}

#[test]
fn startup_creates_root_and_does_not_scan() {
    let root = unique_temp_dir("startup");
    let b = open(&root);
    assert!(root.is_dir());
    assert_eq!(b.cwd(), root);
    assert!(b.is_at_root());
    assert_eq!(b.listing(), &[Entry::Action(ActionTrigger::Rescan)]);
    assert!(b.last_scan().is_none());
    assert!(!index_cache::cache_path(&root).exists());
    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn rescan_enter_and_leave_directory() {
    let root = sample_root("scenario");
    let mut b = open(&root);

    assert_eq!(b.apply_event(BrowserEvent::Rescan), Transition::Rescanned);
    assert_eq!(
        labels(&b),
        ["[ UPDATE ROM LIST ]", "[ DEMOS ]", "[ GAMES ]", "a.gb", "B.GBC"]
    );
    assert_eq!(b.selected(), 1);
    assert_eq!(
        std::fs::read_to_string(root.join(".roms.idx")).unwrap(),
        "D:DEMOS\nD:GAMES\nF:a.gb\nF:B.GBC\n"
    );

    assert_eq!(b.apply_event(BrowserEvent::Activate), Transition::DirectoryChanged);
    assert_eq!(b.cwd(), root.join("DEMOS"));
    assert_eq!(b.selected(), 0);
    assert_eq!(
        b.listing(),
        &[
            Entry::Action(ActionTrigger::ParentDirectory),
            Entry::Action(ActionTrigger::Rescan)
        ]
    );
    assert!(root.join("DEMOS").join(".roms.idx").exists());
    assert_eq!(
        std::fs::read_to_string(root.join("last_pos.txt")).unwrap(),
        root.join("DEMOS").to_string_lossy()
    );

    assert_eq!(b.apply_event(BrowserEvent::NavigateUp), Transition::DirectoryChanged);
    assert_eq!(b.cwd(), root);
    assert_eq!(b.listing().len(), 5);
    assert_eq!(b.apply_event(BrowserEvent::NavigateUp), Transition::Ignored);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn launch_is_terminal() {
    let root = sample_root("launch");
    let mut b = open(&root);
    b.apply_event(BrowserEvent::Rescan);

    let i = position(&b, "a.gb");
    assert_eq!(b.apply_event(BrowserEvent::Select(i)), Transition::SelectionMoved);
    assert_eq!(
        b.apply_event(BrowserEvent::Activate),
        Transition::Launch(root.join("a.gb"))
    );
    assert_eq!(b.launch_path(), Some(root.join("a.gb").as_path()));

    let before = labels(&b);
    for ev in [
        BrowserEvent::MoveSelection(1),
        BrowserEvent::Select(0),
        BrowserEvent::Activate,
        BrowserEvent::Rescan,
    ] {
        assert_eq!(b.apply_event(ev), Transition::Ignored);
    }
    assert_eq!(labels(&b), before);
    assert_eq!(b.selected(), i);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn selection_wraps_and_ignores_out_of_range() {
    let root = sample_root("selection");
    let mut b = open(&root);
    b.apply_event(BrowserEvent::Rescan);
    b.apply_event(BrowserEvent::Select(0));

    assert_eq!(b.apply_event(BrowserEvent::MoveSelection(-1)), Transition::SelectionMoved);
    assert_eq!(b.selected(), 4);
    assert_eq!(b.apply_event(BrowserEvent::MoveSelection(1)), Transition::SelectionMoved);
    assert_eq!(b.selected(), 0);
    assert_eq!(b.apply_event(BrowserEvent::MoveSelection(12)), Transition::SelectionMoved);
    assert_eq!(b.selected(), 2);
    assert_eq!(b.apply_event(BrowserEvent::Select(5)), Transition::Ignored);
    assert_eq!(b.selected(), 2);
    assert_eq!(b.selected_entry(), Some(&Entry::Directory("GAMES".into())));

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn extreme_selection_deltas_do_not_overflow() {
    let root = sample_root("extreme_delta");
    let mut b = open(&root);
    b.apply_event(BrowserEvent::Rescan);
    b.apply_event(BrowserEvent::Select(4));

    assert_eq!(
        b.apply_event(BrowserEvent::MoveSelection(isize::MAX)),
        Transition::SelectionMoved
    );
    assert_eq!(b.selected(), (4 + isize::MAX.rem_euclid(5) as usize) % 5);
    let before = b.selected();
    assert_eq!(
        b.apply_event(BrowserEvent::MoveSelection(isize::MIN)),
        Transition::SelectionMoved
    );
    assert_eq!(b.selected(), (before + isize::MIN.rem_euclid(5) as usize) % 5);
    assert!(b.selected() < b.listing().len());

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn deleted_directory_falls_back_to_root() {
    let root = sample_root("deleted_dir");
    let mut b = open(&root);
    b.apply_event(BrowserEvent::Rescan);
    let i = position(&b, "[ GAMES ]");
    std::fs::remove_dir_all(root.join("GAMES")).unwrap();

    b.apply_event(BrowserEvent::Select(i));
    assert_eq!(b.apply_event(BrowserEvent::Activate), Transition::DirectoryChanged);
    assert_eq!(b.cwd(), root);
    assert!(b.is_at_root());
    assert_eq!(b.listing()[0], Entry::Action(ActionTrigger::Rescan));
    assert_eq!(
        std::fs::read_to_string(root.join("last_pos.txt")).unwrap(),
        root.to_string_lossy()
    );
    assert!(!root.join("GAMES").exists());

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn reopen_resumes_last_visited_directory() {
    let root = sample_root("resume");
    {
        let mut b = open(&root);
        b.apply_event(BrowserEvent::Rescan);
        let i = position(&b, "[ GAMES ]");
        b.apply_event(BrowserEvent::Select(i));
        b.apply_event(BrowserEvent::Activate);
        assert_eq!(b.cwd(), root.join("GAMES"));
    }
    let b = open(&root);
    assert_eq!(b.cwd(), root.join("GAMES"));
    assert_eq!(b.listing()[0], Entry::Action(ActionTrigger::ParentDirectory));

    std::fs::remove_dir_all(root.join("GAMES")).unwrap();
    let b = open(&root);
    assert_eq!(b.cwd(), root);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn pointer_outside_sandbox_falls_back_to_root() {
    let root = sample_root("pointer");
    let sandbox = Sandbox::new(&root);
    let outside = std::env::temp_dir();
    std::fs::write(last_visited::pointer_path(&sandbox), outside.to_string_lossy().as_bytes())
        .unwrap();
    assert_eq!(last_visited::load(&StdFileSystem, &sandbox), root);

    let escape = root.join("GAMES").join("..").join("..");
    std::fs::write(last_visited::pointer_path(&sandbox), escape.to_string_lossy().as_bytes())
        .unwrap();
    assert_eq!(last_visited::load(&StdFileSystem, &sandbox), root);

    last_visited::save(&StdFileSystem, &sandbox, &root.join("DEMOS")).unwrap();
    assert_eq!(last_visited::load(&StdFileSystem, &sandbox), root.join("DEMOS"));

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn entry_named_dotdot_cannot_escape() {
    let root = sample_root("dotdot");
    let games = root.join("GAMES");
    std::fs::write(
        games.join(".roms.idx"),
        "D:..\nD:.\nD:../../etc\nF:x.gb\n",
    )
    .unwrap();
    last_visited::save(&StdFileSystem, &Sandbox::new(&root), &games).unwrap();

    let mut b = open(&root);
    assert_eq!(b.cwd(), games);
    assert_eq!(b.skipped_records(), 1);
    assert_eq!(
        labels(&b),
        ["..", "[ UPDATE ROM LIST ]", "[ .. ]", "[ . ]", "x.gb"]
    );

    let i = position(&b, "[ .. ]");
    b.apply_event(BrowserEvent::Select(i));
    assert_eq!(b.apply_event(BrowserEvent::Activate), Transition::DirectoryChanged);
    assert_eq!(b.cwd(), root);

    // Walk every directory entry and back up again; the cwd never leaves the root.
    let sandbox = Sandbox::new(&root);
    for step in 0..40 {
        let len = b.listing().len();
        b.apply_event(BrowserEvent::Select(step % len));
        if let Transition::Launch(p) = b.apply_event(BrowserEvent::Activate) {
            assert!(sandbox.contains(&p), "{} escaped", p.display());
            break;
        }
        assert!(sandbox.contains(b.cwd()), "{} escaped", b.cwd().display());
    }

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn listing_is_bounded_by_capacity() {
    let root = unique_temp_dir("bounded");
    std::fs::create_dir_all(&root).unwrap();
    for i in 0..20 {
        touch(&root.join(format!("{i:02}.gb")));
    }
    let mut b: Browser<StdFileSystem, 8> =
        Browser::open(StdFileSystem, BrowserConfig::new(&root)).unwrap();
    b.apply_event(BrowserEvent::Rescan);

    assert_eq!(b.listing().len(), 8);
    let report = b.last_scan().copied().unwrap();
    // 20 roms plus the last visited pointer file
    assert_eq!(report.scanned, 21);
    assert_eq!(report.retained, 8);
    assert_eq!(report.dropped, 12);
    let names: Vec<_> = b.listing()[1..]
        .iter()
        .map(|e| match e {
            Entry::Launchable(n) => n.clone(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn progress_callback_sees_scan() {
    let root = unique_temp_dir("progress_cb");
    std::fs::create_dir_all(&root).unwrap();
    for i in 0..5 {
        touch(&root.join(format!("{i}.gb")));
    }
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut b = Browser::<_>::open(StdFileSystem, BrowserConfig::new(&root).progress_interval(2))
        .unwrap();
    let sink = Rc::clone(&seen);
    b.set_progress_callback(move |p| sink.borrow_mut().push(p.scanned));
    b.apply_event(BrowserEvent::Rescan);

    // five roms plus the last visited pointer file
    assert_eq!(*seen.borrow(), vec![2, 4, 6]);
    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn root_that_is_a_file_is_an_error() {
    let parent = unique_temp_dir("root_file");
    std::fs::create_dir_all(&parent).unwrap();
    let root = parent.join("roms");
    touch(&root);

    let err = Browser::<_>::open(StdFileSystem, BrowserConfig::new(&root)).err();
    assert!(matches!(err, Some(BrowserError::SandboxNotDirectory(p)) if p == root));

    std::fs::remove_dir_all(&parent).unwrap();
}

/// `StdFileSystem` with switchable failures.
#[derive(Default)]
struct FlakyFs {
    inner: StdFileSystem,
    fail_read_dir: Cell<bool>,
    /// Append one failing item to every enumeration
    bad_item: Cell<bool>,
    fail_open_write: Cell<bool>,
    fail_create_dir: Cell<bool>,
    /// Bytes accepted by a writer before it starts failing
    write_budget: Cell<Option<usize>>,
}

struct ShortWriter<'a> {
    inner: Box<dyn Write + 'a>,
    left: usize,
}

impl Write for ShortWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.left == 0 {
            return Err(std::io::Error::other("medium removed"));
        }
        let n = buf.len().min(self.left);
        let n = self.inner.write(&buf[..n])?;
        self.left -= n;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

fn injected() -> std::io::Error {
    std::io::Error::other("injected failure")
}

impl FileSystem for FlakyFs {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn read_dir(&self, dir: &Path) -> std::io::Result<DirIter<'_>> {
        if self.fail_read_dir.get() {
            return Err(injected());
        }
        let iter = self.inner.read_dir(dir)?;
        if self.bad_item.get() {
            Ok(Box::new(iter.chain(std::iter::once(Err(injected())))))
        } else {
            Ok(iter)
        }
    }

    fn open_read(&self, path: &Path) -> std::io::Result<Box<dyn BufRead + '_>> {
        self.inner.open_read(path)
    }

    fn open_write(&self, path: &Path) -> std::io::Result<Box<dyn Write + '_>> {
        if self.fail_open_write.get() {
            return Err(injected());
        }
        let inner = self.inner.open_write(path)?;
        match self.write_budget.get() {
            Some(left) => Ok(Box::new(ShortWriter { inner, left })),
            None => Ok(inner),
        }
    }

    fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        self.inner.remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        if self.fail_create_dir.get() {
            return Err(injected());
        }
        self.inner.create_dir_all(path)
    }
}

#[test]
fn unavailable_root_is_reported() {
    let root = unique_temp_dir("no_root");
    let fs = FlakyFs::default();
    fs.fail_create_dir.set(true);
    let err = Browser::<_>::open(&fs, BrowserConfig::new(&root)).err();
    assert!(matches!(err, Some(BrowserError::SandboxUnavailable { .. })));
    assert!(!root.exists());
}

#[test]
fn unreadable_directory_indexes_as_empty() {
    let root = sample_root("flaky_read");
    let fs = FlakyFs::default();
    let mut b = Browser::<_>::open(&fs, BrowserConfig::new(&root)).unwrap();

    fs.fail_read_dir.set(true);
    assert_eq!(b.apply_event(BrowserEvent::Rescan), Transition::Rescanned);
    assert!(b.last_scan().unwrap().dir_unavailable);
    assert_eq!(b.listing(), &[Entry::Action(ActionTrigger::Rescan)]);
    assert_eq!(b.selected(), 0);
    assert_eq!(
        std::fs::read_to_string(index_cache::cache_path(&root)).unwrap(),
        ""
    );

    fs.fail_read_dir.set(false);
    b.apply_event(BrowserEvent::Rescan);
    assert_eq!(b.listing().len(), 5);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn failed_enumeration_items_are_counted() {
    let root = sample_root("bad_item");
    let fs = FlakyFs::default();
    let mut b = Browser::<_>::open(&fs, BrowserConfig::new(&root)).unwrap();

    fs.bad_item.set(true);
    assert_eq!(b.apply_event(BrowserEvent::Rescan), Transition::Rescanned);
    let report = b.last_scan().copied().unwrap();
    assert_eq!(report.unreadable, 1);
    assert!(!report.dir_unavailable);
    // five sample objects, the pointer file and the failing item
    assert_eq!(report.scanned, 7);
    assert_eq!(report.retained, 4);
    assert_eq!(b.listing().len(), 5);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn failed_cache_write_keeps_browsing() {
    let root = sample_root("flaky_write");
    let fs = FlakyFs::default();
    let mut b = Browser::<_>::open(&fs, BrowserConfig::new(&root)).unwrap();
    b.apply_event(BrowserEvent::Rescan);
    assert_eq!(b.listing().len(), 5);

    fs.fail_open_write.set(true);
    let i = position(&b, "[ GAMES ]");
    b.apply_event(BrowserEvent::Select(i));
    assert_eq!(b.apply_event(BrowserEvent::Activate), Transition::DirectoryChanged);
    assert_eq!(b.cwd(), root.join("GAMES"));
    assert_eq!(
        b.listing(),
        &[
            Entry::Action(ActionTrigger::ParentDirectory),
            Entry::Action(ActionTrigger::Rescan)
        ]
    );
    assert!(!root.join("GAMES").join(".roms.idx").exists());

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn partial_cache_write_is_removed() {
    let root = sample_root("short_write");
    let fs = FlakyFs::default();
    fs.write_budget.set(Some(6));

    let entries = [
        rom_browser::IndexedEntry::directory("DEMOS"),
        rom_browser::IndexedEntry::launchable("a.gb"),
    ];
    let err = index_cache::write(&fs, &root, &entries).unwrap_err();
    assert!(matches!(err, BrowserError::CacheWrite { .. }));
    assert!(!index_cache::cache_path(&root).exists());

    std::fs::remove_dir_all(&root).unwrap();
}
