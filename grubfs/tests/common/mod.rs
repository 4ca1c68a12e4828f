// SPDX-License-Identifier: MIT OR Apache-2.0

//! A RAM disk, a tiny table-driven filesystem driver for it and a stub root
//! dispatch table.
//!
//! On-disk format of the test filesystem, all integers little endian:
//!
//! - sector 0: magic `TBLFS\0\0\0`, entry count (u32), label (16 bytes,
//!   NUL padded), UUID (40 bytes, NUL padded, empty = none)
//! - sectors 1..: entries of 64 bytes: path without leading `/` (48 bytes,
//!   NUL padded), first sector (u32), size (u32), flags (u32, 1 = dir),
//!   reserved (u32)
//! - file contents, each starting on a sector boundary

#![allow(dead_code)]

use core::ffi::c_void;
use grubfs::{
    BlockDevice, Bridge, Device, DirHook, DirhookInfo, DriverFile, Env, FileSystem, FsDriver,
    GrubErr, GrubResult, Volume,
};
use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;
use uefi::Status;
use uefi_raw::protocol::file_system::{
    FileAttribute, FileMode, FileProtocolRevision, FileProtocolV1,
};
use uefi_raw::{Char16, Guid};

pub const SECTOR: usize = 512;
const MAGIC: &[u8; 8] = b"TBLFS\0\0\0";
const ENTRY_SIZE: usize = 64;
const NAME_LEN: usize = 48;
const FLAG_DIR: u32 = 1;

/// Shared switches and counters of a [`RamDisk`].
#[derive(Debug, Default)]
pub struct DiskStats {
    pub reads: Cell<usize>,
    pub fail: Cell<bool>,
}

/// Block device backed by a byte vector.
pub struct RamDisk {
    image: Vec<u8>,
    media: Option<u32>,
    stats: Rc<DiskStats>,
}

impl RamDisk {
    pub fn new(image: Vec<u8>, media: Option<u32>) -> (Self, Rc<DiskStats>) {
        let stats = Rc::new(DiskStats::default());
        let disk = Self {
            image,
            media,
            stats: Rc::clone(&stats),
        };
        (disk, stats)
    }
}

impl BlockDevice for RamDisk {
    fn media_id(&self) -> Option<u32> {
        self.media
    }

    fn read_disk(&self, media_id: u32, offset: u64, buffer: &mut [u8]) -> uefi::Result {
        self.stats.reads.set(self.stats.reads.get() + 1);
        if self.stats.fail.get() {
            return Err(Status::DEVICE_ERROR.into());
        }
        if Some(media_id) != self.media {
            return Err(Status::MEDIA_CHANGED.into());
        }
        let start = offset as usize;
        let Some(source) = self.image.get(start..start + buffer.len()) else {
            return Err(Status::INVALID_PARAMETER.into());
        };
        buffer.copy_from_slice(source);
        Ok(())
    }
}

/// Builds images of the test filesystem.
#[derive(Default)]
pub struct ImageBuilder {
    label: String,
    uuid: String,
    entries: Vec<(String, u32, Vec<u8>)>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn uuid(mut self, uuid: &str) -> Self {
        self.uuid = uuid.to_string();
        self
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.entries.push((path.to_string(), FLAG_DIR, Vec::new()));
        self
    }

    pub fn file(mut self, path: &str, contents: &[u8]) -> Self {
        self.entries.push((path.to_string(), 0, contents.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let table_sectors = (self.entries.len() * ENTRY_SIZE).div_ceil(SECTOR);
        let mut image = vec![0; (1 + table_sectors) * SECTOR];

        image[..8].copy_from_slice(MAGIC);
        image[8..12].copy_from_slice(&(self.entries.len() as u32).to_le_bytes());
        image[12..12 + self.label.len()].copy_from_slice(self.label.as_bytes());
        image[28..28 + self.uuid.len()].copy_from_slice(self.uuid.as_bytes());

        for (i, (path, flags, contents)) in self.entries.iter().enumerate() {
            let first_sector = (image.len() / SECTOR) as u32;
            let entry = SECTOR + i * ENTRY_SIZE;
            image[entry..entry + path.len()].copy_from_slice(path.as_bytes());
            image[entry + 48..entry + 52].copy_from_slice(&first_sector.to_le_bytes());
            image[entry + 52..entry + 56].copy_from_slice(&(contents.len() as u32).to_le_bytes());
            image[entry + 56..entry + 60].copy_from_slice(&flags.to_le_bytes());

            image.extend_from_slice(contents);
            image.resize(image.len().next_multiple_of(SECTOR), 0);
        }
        image
    }
}

/// Image used by most tests.
pub fn sample_image() -> Vec<u8> {
    ImageBuilder::new()
        .label("TESTVOL")
        .uuid("0b7d1a4e-3c2f-4e8a-9d61-5f0c2b7e9a13")
        .dir("boot")
        .file("boot/grub.cfg", b"set timeout=5\n")
        .file("boot/vmlinuz", &[0xa5; 1300])
        .dir("etc")
        .file("etc/hostname", b"grubfs\n")
        .file("readme.txt", &(0..100).collect::<Vec<u8>>())
        .build()
}

struct Entry {
    path: String,
    first_sector: u64,
    size: u64,
    dir: bool,
}

/// Per-file driver state, counting its own drops.
pub struct OpenEntry {
    first_sector: u64,
    drops: Rc<Cell<usize>>,
}

impl Drop for OpenEntry {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// Switches and counters of a [`TableFs`].
#[derive(Debug, Default)]
pub struct FsStats {
    pub opens: Cell<usize>,
    pub closes: Cell<usize>,
    pub hook_calls: Cell<usize>,
    pub state_drops: Rc<Cell<usize>>,
    /// Make `read` fail with this code.
    pub fail_read: Cell<Option<GrubErr>>,
    /// Make `read` return a negative value without raising an error.
    pub fail_read_silently: Cell<bool>,
    /// Make `read` claim to have read this many bytes more than asked.
    pub overreport: Cell<usize>,
    /// Make `uuid` succeed without a value.
    pub no_uuid: Cell<bool>,
}

/// Driver for the test filesystem.
#[derive(Debug, Default)]
pub struct TableFs {
    pub stats: FsStats,
}

impl TableFs {
    fn entries(&self, env: &Env, device: &Device) -> GrubResult<(Vec<Entry>, [u8; 68])> {
        let disk = device.disk();
        let mut header = [0; 68];
        disk.read(env, 0, 0, &mut header)?;
        if &header[..8] != MAGIC {
            return Err(
                env.error(GrubErr::BAD_FS, format_args!("not a table filesystem")),
            );
        }
        let count = u32::from_le_bytes(header[8..12].try_into().unwrap()) as usize;

        let mut table = vec![0; count * ENTRY_SIZE];
        disk.read(env, 1, 0, &mut table)?;
        let entries = table
            .chunks(ENTRY_SIZE)
            .map(|raw| Entry {
                path: cstr(&raw[..NAME_LEN]),
                first_sector: u64::from(u32::from_le_bytes(raw[48..52].try_into().unwrap())),
                size: u64::from(u32::from_le_bytes(raw[52..56].try_into().unwrap())),
                dir: u32::from_le_bytes(raw[56..60].try_into().unwrap()) & FLAG_DIR != 0,
            })
            .collect();
        Ok((entries, header))
    }
}

fn cstr(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

fn parent(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

impl FsDriver for TableFs {
    const NAME: &'static str = "tablefs";

    fn open(&self, env: &Env, file: &mut DriverFile, path: &str) -> GrubResult {
        self.stats.opens.set(self.stats.opens.get() + 1);
        let (entries, _) = self.entries(env, file.device())?;
        let wanted = path.trim_start_matches('/');
        let Some(entry) = entries.iter().find(|e| e.path == wanted) else {
            return Err(env.error(
                GrubErr::FILE_NOT_FOUND,
                format_args!("file `{path}' not found"),
            ));
        };
        if entry.dir {
            return Err(
                env.error(GrubErr::BAD_FILE_TYPE, format_args!("not a regular file")),
            );
        }
        file.set_size(entry.size);
        file.set_data(OpenEntry {
            first_sector: entry.first_sector,
            drops: Rc::clone(&self.stats.state_drops),
        });
        Ok(())
    }

    fn read(&self, env: &Env, file: &mut DriverFile, buf: &mut [u8]) -> isize {
        if let Some(err) = self.stats.fail_read.get() {
            let _ = env.error(err, format_args!("injected failure"));
            return -1;
        }
        if self.stats.fail_read_silently.get() {
            return -1;
        }
        let Some(first_sector) = file.data::<OpenEntry>().map(|e| e.first_sector) else {
            let _ = env.error(GrubErr::BUG, format_args!("file is not open"));
            return -1;
        };
        let disk = file.device().disk();
        if disk.read(env, first_sector, file.offset(), buf).is_err() {
            return -1;
        }
        (buf.len() + self.stats.overreport.get()) as isize
    }

    fn close(&self, _env: &Env, file: &mut DriverFile) {
        self.stats.closes.set(self.stats.closes.get() + 1);
        file.clear_data();
    }

    fn dir(&self, env: &Env, device: &Device, path: &str, hook: &mut DirHook<'_>) -> GrubResult {
        let (entries, _) = self.entries(env, device)?;
        let wanted = path.trim_matches('/');
        if !wanted.is_empty() && !entries.iter().any(|e| e.dir && e.path == wanted) {
            return Err(env.error(
                GrubErr::FILE_NOT_FOUND,
                format_args!("directory `{path}' not found"),
            ));
        }
        for entry in entries.iter().filter(|e| parent(&e.path) == wanted) {
            self.stats.hook_calls.set(self.stats.hook_calls.get() + 1);
            let name = entry.path.rsplit('/').next().unwrap_or(&entry.path);
            let info = if entry.dir {
                DirhookInfo::directory()
            } else {
                DirhookInfo::file()
            };
            if let ControlFlow::Break(()) = hook(name, &info) {
                break;
            }
        }
        Ok(())
    }

    fn label(&self, env: &Env, device: &Device) -> GrubResult<Option<String>> {
        let (_, header) = self.entries(env, device)?;
        let label = cstr(&header[12..28]);
        Ok((!label.is_empty()).then_some(label))
    }

    fn uuid(&self, env: &Env, device: &Device) -> GrubResult<Option<String>> {
        if self.stats.no_uuid.get() {
            return Ok(None);
        }
        let (_, header) = self.entries(env, device)?;
        let uuid = cstr(&header[28..68]);
        Ok((!uuid.is_empty()).then_some(uuid))
    }
}

unsafe extern "efiapi" fn stub_open(
    _this: *mut FileProtocolV1,
    _new_handle: *mut *mut FileProtocolV1,
    _file_name: *const Char16,
    _open_mode: FileMode,
    _attributes: FileAttribute,
) -> Status {
    Status::UNSUPPORTED
}

unsafe extern "efiapi" fn stub_close(_this: *mut FileProtocolV1) -> Status {
    Status::SUCCESS
}

unsafe extern "efiapi" fn stub_delete(_this: *mut FileProtocolV1) -> Status {
    Status::WARN_DELETE_FAILURE
}

unsafe extern "efiapi" fn stub_read(
    _this: *mut FileProtocolV1,
    _buffer_size: *mut usize,
    _buffer: *mut c_void,
) -> Status {
    Status::UNSUPPORTED
}

unsafe extern "efiapi" fn stub_write(
    _this: *mut FileProtocolV1,
    _buffer_size: *mut usize,
    _buffer: *const c_void,
) -> Status {
    Status::WRITE_PROTECTED
}

unsafe extern "efiapi" fn stub_get_position(
    _this: *const FileProtocolV1,
    _position: *mut u64,
) -> Status {
    Status::UNSUPPORTED
}

unsafe extern "efiapi" fn stub_set_position(_this: *mut FileProtocolV1, _position: u64) -> Status {
    Status::UNSUPPORTED
}

unsafe extern "efiapi" fn stub_get_info(
    _this: *mut FileProtocolV1,
    _information_type: *const Guid,
    _buffer_size: *mut usize,
    _buffer: *mut c_void,
) -> Status {
    Status::UNSUPPORTED
}

unsafe extern "efiapi" fn stub_set_info(
    _this: *mut FileProtocolV1,
    _information_type: *const Guid,
    _buffer_size: usize,
    _buffer: *const c_void,
) -> Status {
    Status::WRITE_PROTECTED
}

unsafe extern "efiapi" fn stub_flush(_this: *mut FileProtocolV1) -> Status {
    Status::SUCCESS
}

/// Root dispatch table of a read-only volume.
pub fn root_protocol() -> FileProtocolV1 {
    FileProtocolV1 {
        revision: FileProtocolRevision::REVISION_1,
        open: stub_open,
        close: stub_close,
        delete: stub_delete,
        read: stub_read,
        write: stub_write,
        get_position: stub_get_position,
        set_position: stub_set_position,
        get_info: stub_get_info,
        set_info: stub_set_info,
        flush: stub_flush,
    }
}

/// Returns true if both tables dispatch to the same functions.
pub fn same_dispatch(a: &FileProtocolV1, b: &FileProtocolV1) -> bool {
    a.revision == b.revision
        && a.open as usize == b.open as usize
        && a.close as usize == b.close as usize
        && a.delete as usize == b.delete as usize
        && a.read as usize == b.read as usize
        && a.write as usize == b.write as usize
        && a.get_position as usize == b.get_position as usize
        && a.set_position as usize == b.set_position as usize
        && a.get_info as usize == b.get_info as usize
        && a.set_info as usize == b.set_info as usize
        && a.flush as usize == b.flush as usize
}

/// A bridge with the sample image mounted.
pub fn mounted() -> (Bridge<TableFs>, FileSystem, Rc<DiskStats>) {
    let (disk, stats) = RamDisk::new(sample_image(), Some(3));
    let bridge = Bridge::new(TableFs::default());
    let volume = Volume::new("PciRoot(0x0)/Pci(0x1,0x1)/Ata(0x0)", Some(Box::new(disk)));
    let fs = bridge.mount(volume, &root_protocol()).unwrap();
    (bridge, fs, stats)
}
