//! Read-only mapping of a physical memory window
//!
//! Used by the /dev/mem backend to read the PM table where the SMU publishes
//! it. The mapping is page aligned; callers address it relative to the
//! requested physical address.

use crate::error::{Result, SmuError};
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsFd;
use std::path::Path;
use std::ptr::NonNull;

/// Memory-mapped physical region
///
/// Bounds-checked, read-only view of `len` bytes at `phys_addr`.
#[derive(Debug)]
pub struct PhysRegion {
    ptr: NonNull<u8>,
    map_len: usize,
    page_offset: usize,
    len: usize,
    phys_addr: u64,
    _file: File,
}

impl PhysRegion {
    /// Map `len` bytes of physical memory at `phys_addr` through `mem_path`
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `mem_path` cannot be opened (not root, or no `iomem=relaxed`)
    /// - `len` is zero
    /// - mmap fails
    pub fn map(mem_path: &Path, phys_addr: u64, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(SmuError::memory_access("Cannot map an empty region"));
        }

        let file = OpenOptions::new().read(true).open(mem_path).map_err(|e| {
            SmuError::memory_access(format!(
                "Cannot open {}: {e}. Run as root (and boot with iomem=relaxed)",
                mem_path.display()
            ))
        })?;

        let page = rustix::param::page_size() as u64;
        let base = phys_addr & !(page - 1);
        // Below one page, so it fits in usize
        #[allow(clippy::cast_possible_truncation)]
        let page_offset = (phys_addr - base) as usize;
        let map_len = page_offset + len;

        tracing::debug!("Mapping {len:#x} bytes of physical memory at {phys_addr:#x}");

        // SAFETY: mmap preconditions:
        // - File descriptor is valid (just opened, kept alive in the struct)
        // - map_len is non-zero (len checked above)
        // - Offset `base` is page aligned (masked above)
        // - PROT_READ only: the table is written by firmware, never by us
        // - MAP_SHARED so later firmware updates are visible through the mapping
        // - Unmapped in Drop with the same map_len
        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                map_len,
                ProtFlags::READ,
                MapFlags::SHARED,
                file.as_fd(),
                base,
            )
            .map_err(|e| SmuError::memory_access(format!("mmap of {phys_addr:#x} failed: {e}")))?
        };
        let ptr = NonNull::new(ptr.cast::<u8>())
            .ok_or_else(|| SmuError::memory_access("mmap returned a null mapping"))?;

        tracing::info!("Mapped PM table window {phys_addr:#x}+{len:#x} at {ptr:p}");

        Ok(Self {
            ptr,
            map_len,
            page_offset,
            len,
            phys_addr,
            _file: file,
        })
    }

    /// Copy `buffer.len()` bytes starting `offset` bytes into the region
    ///
    /// # Errors
    ///
    /// Returns error if the read would exceed the mapped length.
    pub fn read_bytes(&self, offset: usize, buffer: &mut [u8]) -> Result<()> {
        if offset + buffer.len() > self.len {
            return Err(SmuError::memory_access(format!(
                "Out of bounds read: offset={offset:#x}, size={:#x}, limit={:#x}",
                buffer.len(),
                self.len
            )));
        }

        // SAFETY: copy_nonoverlapping requires:
        // - src valid for buffer.len() bytes: page_offset + offset + len <= map_len (checked above)
        // - dst valid for writes: buffer is a live mutable slice
        // - No overlap: src is the device mapping, dst is process heap/stack
        // - Alignment: u8 has alignment 1
        unsafe {
            let src = self.ptr.as_ptr().add(self.page_offset + offset);
            std::ptr::copy_nonoverlapping(src, buffer.as_mut_ptr(), buffer.len());
        }

        Ok(())
    }

    /// `true` when the first `other.len()` bytes of the region equal `other`
    ///
    /// # Errors
    ///
    /// Returns error if `other` is longer than the region.
    pub fn matches(&self, other: &[u8]) -> Result<bool> {
        let mut live = vec![0u8; other.len()];
        self.read_bytes(0, &mut live)?;
        Ok(live == other)
    }

    /// Mapped length as requested (excluding page alignment slack)
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false: `map` rejects empty regions.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Physical address the region starts at
    pub const fn phys_addr(&self) -> u64 {
        self.phys_addr
    }
}

impl Drop for PhysRegion {
    fn drop(&mut self) {
        tracing::debug!("Unmapping PM table window {:#x}", self.phys_addr);

        // SAFETY: munmap requires:
        // - addr returned by mmap: ptr.sub(page_offset) is exactly what mmap returned
        // - length matching the mmap call: map_len
        // - no outstanding references into the mapping (we are in Drop)
        unsafe {
            let base = self.ptr.as_ptr().sub(self.page_offset);
            if let Err(e) = munmap(base.cast(), self.map_len) {
                tracing::error!("munmap failed during drop: {e}");
            }
        }
    }
}

// SAFETY: PhysRegion exclusively owns its mapping; moving it between threads
// keeps the mapping and the backing fd valid.
unsafe impl Send for PhysRegion {}

// SAFETY: the mapping is read-only and every access is bounds-checked, so
// shared references from several threads cannot race on our side.
unsafe impl Sync for PhysRegion {}
