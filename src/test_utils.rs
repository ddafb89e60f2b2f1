//! Scripted codec backend for exercising the engines without libarchive

use crate::backend::{Backend, Block, DataBlock, DiskSession, EntryView, Header, ReadSession};
use crate::entry::FileType;
use crate::error::{Error, Result};
use crate::status::ARCHIVE_FATAL;
use crate::extract::ExtractFlags;
use crate::status::{Code, Status};
use std::borrow::Cow;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Every call the engines made on the scripted handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    OpenReader(PathBuf, usize),
    ReleaseReader,
    OpenWriter(ExtractFlags),
    NextHeader,
    SkipData,
    ReadBlock,
    WriteHeader(String),
    Hardlink(String),
    WriteBlock { bytes: Vec<u8>, offset: i64 },
    FinishEntry,
    CloseWriter,
    ReleaseWriter,
}

/// One entry as the scripted reader returns it, with the statuses each call yields
#[derive(Debug, Clone)]
pub(crate) struct ScriptedEntry {
    pub path: Option<String>,
    pub hardlink: Option<String>,
    pub symlink: Option<String>,
    pub file_type: FileType,
    pub size: u64,
    pub blocks: Vec<(Vec<u8>, i64)>,
    pub header: Code,
    pub read_error: Option<Code>,
    pub write_header: Code,
    pub write_block: Code,
    pub finish: Code,
}

impl ScriptedEntry {
    pub fn file(path: &str, data: &[u8]) -> Self {
        ScriptedEntry {
            path: Some(path.to_string()),
            hardlink: None,
            symlink: None,
            file_type: FileType::RegularFile,
            size: data.len() as u64,
            blocks: if data.is_empty() {
                Vec::new()
            } else {
                vec![(data.to_vec(), 0)]
            },
            header: Code::Ok,
            read_error: None,
            write_header: Code::Ok,
            write_block: Code::Ok,
            finish: Code::Ok,
        }
    }

    pub fn dir(path: &str) -> Self {
        ScriptedEntry {
            file_type: FileType::Directory,
            ..Self::file(path, b"")
        }
    }

    pub fn symlink(path: &str, target: &str) -> Self {
        ScriptedEntry {
            file_type: FileType::SymbolicLink,
            symlink: Some(target.to_string()),
            ..Self::file(path, b"")
        }
    }

    pub fn blocks(mut self, blocks: &[(&[u8], i64)]) -> Self {
        self.blocks = blocks.iter().map(|(b, o)| (b.to_vec(), *o)).collect();
        self.size = blocks.iter().map(|(b, o)| *o as u64 + b.len() as u64).max().unwrap_or(0);
        self
    }

    pub fn hardlink(mut self, target: &str) -> Self {
        self.hardlink = Some(target.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Item {
    Entry(ScriptedEntry),
    HeaderError(Code),
}

/// Backend replaying a fixed list of headers
#[derive(Debug, Clone)]
pub(crate) struct ScriptedBackend {
    pub items: Vec<Item>,
    pub open_fails: bool,
    pub writer_fails: bool,
    pub close: Code,
    pub events: Rc<RefCell<Vec<Event>>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        ScriptedBackend {
            items: Vec::new(),
            open_fails: false,
            writer_fails: false,
            close: Code::Ok,
            events: Rc::default(),
        }
    }
}

impl ScriptedBackend {
    pub fn new(entries: Vec<ScriptedEntry>) -> Self {
        Self::with_items(entries.into_iter().map(Item::Entry).collect())
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        ScriptedBackend {
            items,
            ..Default::default()
        }
    }

    pub fn failing_open() -> Self {
        ScriptedBackend {
            open_fails: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }

    pub fn headers_written(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::WriteHeader(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn failing_writer(entries: Vec<ScriptedEntry>) -> Self {
        ScriptedBackend {
            writer_fails: true,
            ..Self::new(entries)
        }
    }

    fn log(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

fn status(code: Code, what: &str) -> Status {
    if code < Code::Ok {
        Status::with_message(code, format!("scripted {what} {code}"))
    } else {
        Status::new(code)
    }
}

struct Current {
    entry: ScriptedEntry,
    next_block: usize,
}

pub(crate) struct ScriptedReader {
    items: Vec<Item>,
    cursor: usize,
    current: Option<Current>,
    events: Rc<RefCell<Vec<Event>>>,
}

pub(crate) struct ScriptedEntryView<'a> {
    entry: &'a mut ScriptedEntry,
}

impl EntryView for ScriptedEntryView<'_> {
    fn pathname(&self) -> Option<Cow<'_, Path>> {
        self.entry.path.as_deref().map(|p| Cow::Borrowed(Path::new(p)))
    }

    fn size(&self) -> u64 {
        self.entry.size
    }

    fn file_type(&self) -> FileType {
        self.entry.file_type
    }

    fn hardlink(&self) -> Option<Cow<'_, Path>> {
        self.entry.hardlink.as_deref().map(|p| Cow::Borrowed(Path::new(p)))
    }

    fn symlink(&self) -> Option<Cow<'_, Path>> {
        self.entry.symlink.as_deref().map(|p| Cow::Borrowed(Path::new(p)))
    }

    fn set_pathname(&mut self, path: &Path) -> Result<()> {
        self.entry.path = Some(path.to_string_lossy().into_owned());
        Ok(())
    }

    fn set_hardlink(&mut self, path: &Path) -> Result<()> {
        self.entry.hardlink = Some(path.to_string_lossy().into_owned());
        Ok(())
    }
}

impl ReadSession for ScriptedReader {
    type Entry<'a> = ScriptedEntryView<'a>;

    fn next_header(&mut self) -> Header<ScriptedEntryView<'_>> {
        self.events.borrow_mut().push(Event::NextHeader);
        let Some(item) = self.items.get(self.cursor).cloned() else {
            return Header::End;
        };
        self.cursor += 1;

        match item {
            Item::HeaderError(code) => {
                self.current = None;
                Header::Error(status(code, "header"))
            }
            Item::Entry(entry) => {
                let header = status(entry.header, "header");
                let current = self.current.insert(Current {
                    entry,
                    next_block: 0,
                });
                Header::Entry {
                    entry: ScriptedEntryView {
                        entry: &mut current.entry,
                    },
                    status: header,
                }
            }
        }
    }

    fn skip_data(&mut self) -> Status {
        self.events.borrow_mut().push(Event::SkipData);
        Status::OK
    }

    fn read_block(&mut self) -> Block<'_> {
        self.events.borrow_mut().push(Event::ReadBlock);
        let Some(current) = self.current.as_mut() else {
            return Block::Error(status(Code::Fatal, "read without header"));
        };
        if let Some((bytes, offset)) = current.entry.blocks.get(current.next_block) {
            current.next_block += 1;
            return Block::Data(DataBlock {
                bytes,
                offset: *offset,
            });
        }
        match current.entry.read_error {
            Some(code) => Block::Error(status(code, "read")),
            None => Block::End,
        }
    }
}

impl Drop for ScriptedReader {
    fn drop(&mut self) {
        self.events.borrow_mut().push(Event::ReleaseReader);
    }
}

pub(crate) struct ScriptedWriter {
    events: Rc<RefCell<Vec<Event>>>,
    write_block: Code,
    finish: Code,
    close: Code,
    released: bool,
}

impl DiskSession<ScriptedReader> for ScriptedWriter {
    fn write_header(&mut self, entry: &ScriptedEntryView<'_>) -> Status {
        let path = entry.entry.path.clone().unwrap_or_default();
        let mut events = self.events.borrow_mut();
        events.push(Event::WriteHeader(path));
        if let Some(link) = &entry.entry.hardlink {
            events.push(Event::Hardlink(link.clone()));
        }
        drop(events);
        self.write_block = entry.entry.write_block;
        self.finish = entry.entry.finish;
        status(entry.entry.write_header, "write header")
    }

    fn write_block(&mut self, block: &DataBlock<'_>) -> Status {
        self.events.borrow_mut().push(Event::WriteBlock {
            bytes: block.bytes.to_vec(),
            offset: block.offset,
        });
        status(self.write_block, "write block")
    }

    fn finish_entry(&mut self) -> Status {
        self.events.borrow_mut().push(Event::FinishEntry);
        status(self.finish, "finish")
    }

    fn close(mut self) -> Status {
        let mut events = self.events.borrow_mut();
        events.push(Event::CloseWriter);
        events.push(Event::ReleaseWriter);
        drop(events);
        self.released = true;
        status(self.close, "close")
    }
}

impl Drop for ScriptedWriter {
    fn drop(&mut self) {
        if !self.released {
            self.events.borrow_mut().push(Event::ReleaseWriter);
        }
    }
}

impl Backend for ScriptedBackend {
    type Reader = ScriptedReader;
    type Writer = ScriptedWriter;

    fn open_reader(&self, path: &Path, block_size: usize) -> Result<ScriptedReader> {
        if self.open_fails {
            return Err(Error::Open {
                path: path.to_path_buf(),
                message: "scripted open failure".to_string(),
            });
        }
        self.log(Event::OpenReader(path.to_path_buf(), block_size));
        Ok(ScriptedReader {
            items: self.items.clone(),
            cursor: 0,
            current: None,
            events: Rc::clone(&self.events),
        })
    }

    fn open_writer(&self, flags: ExtractFlags) -> Result<ScriptedWriter> {
        if self.writer_fails {
            return Err(Error::Archive {
                code: ARCHIVE_FATAL,
                message: "scripted writer setup failure".to_string(),
            });
        }
        self.log(Event::OpenWriter(flags));
        Ok(ScriptedWriter {
            events: Rc::clone(&self.events),
            write_block: Code::Ok,
            finish: Code::Ok,
            close: self.close,
            released: false,
        })
    }
}

/// Listed paths as strings, for comparing against literals
pub(crate) fn names(paths: &[PathBuf]) -> Vec<&str> {
    paths.iter().map(|p| p.to_str().unwrap_or("<non-utf8>")).collect()
}
