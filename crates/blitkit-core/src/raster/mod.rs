//! NativeRaster - the host raster handle
//!
//! Models a raster as the windowing host hands it out: a backing array
//! plus a sample model saying how pixels are laid out in it. The layout
//! may be anything the host supports; the raster accessor decides how to
//! read it.
//!
//! # Addressing
//!
//! The element index of pixel `(x, y)` is
//! `offset + y * scanline_stride + x * pixel_stride`.
//!
//! # Ownership model
//!
//! Cloning a `NativeRaster` clones the handle. The clone shares the
//! backing [`PixelBuffer`], exactly as two host rasters over one data
//! buffer would.

mod buffer;
pub(crate) mod color_model;

pub use buffer::{Element, PixelBuffer, StorageId};

use crate::error::{Error, Result};
use crate::format::{ChannelMasks, PixelFormat};
use crate::rect::Rect;
use std::sync::{Arc, RwLockReadGuard, RwLockWriteGuard};

/// 16-bit packed RGB layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortLayout {
    /// `0RRRRRGG GGGBBBBB`
    Rgb555,
    /// `RRRRRGGG GGGBBBBB`
    Rgb565,
}

impl ShortLayout {
    /// Channel masks within the 16-bit word.
    pub fn masks(self) -> ChannelMasks {
        match self {
            Self::Rgb555 => ChannelMasks::new(0x7C00, 0x03E0, 0x001F, 0),
            Self::Rgb565 => ChannelMasks::new(0xF800, 0x07E0, 0x001F, 0),
        }
    }
}

/// Byte offsets of each component inside one interleaved pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteOrder {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: Option<u8>,
}

impl ByteOrder {
    /// Three bytes per pixel stored B, G, R.
    pub const BGR: ByteOrder = ByteOrder {
        red: 2,
        green: 1,
        blue: 0,
        alpha: None,
    };

    /// Four bytes per pixel stored A, B, G, R.
    pub const ABGR: ByteOrder = ByteOrder {
        red: 3,
        green: 2,
        blue: 1,
        alpha: Some(0),
    };

    /// Three bytes per pixel stored R, G, B.
    pub const RGB: ByteOrder = ByteOrder {
        red: 0,
        green: 1,
        blue: 2,
        alpha: None,
    };

    /// Bytes occupied by one pixel.
    pub fn pixel_bytes(&self) -> usize {
        let max = self
            .red
            .max(self.green)
            .max(self.blue)
            .max(self.alpha.unwrap_or(0));
        max as usize + 1
    }
}

/// How pixels are laid out in the backing array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleLayout {
    /// One 32-bit word per pixel with arbitrary channel masks
    PackedInt(ChannelMasks),
    /// One 16-bit word per pixel
    PackedShort(ShortLayout),
    /// One byte of linear gray per pixel
    Gray8,
    /// One 16-bit word of linear gray per pixel
    Gray16,
    /// Several bytes per pixel, one per component
    InterleavedBytes(ByteOrder),
    /// One byte per pixel indexing a palette of straight ARGB colors
    Indexed(Arc<[u32]>),
}

impl SampleLayout {
    /// Packed 32-bit layout matching a catalog format.
    pub fn packed(format: PixelFormat) -> Self {
        Self::PackedInt(format.masks())
    }

    /// Element type the layout expects.
    pub fn storage_kind(&self) -> StorageKind {
        match self {
            Self::PackedInt(_) => StorageKind::Int,
            Self::PackedShort(_) | Self::Gray16 => StorageKind::Short,
            Self::Gray8 | Self::InterleavedBytes(_) | Self::Indexed(_) => StorageKind::Byte,
        }
    }

    /// Elements occupied by one pixel.
    pub fn pixel_stride(&self) -> usize {
        match self {
            Self::InterleavedBytes(order) => order.pixel_bytes(),
            _ => 1,
        }
    }

    /// Whether pixels carry an alpha component.
    pub fn has_alpha(&self) -> bool {
        match self {
            Self::PackedInt(masks) => masks.alpha != 0,
            Self::InterleavedBytes(order) => order.alpha.is_some(),
            Self::Indexed(palette) => palette.iter().any(|c| c >> 24 != 0xFF),
            Self::PackedShort(_) | Self::Gray8 | Self::Gray16 => false,
        }
    }
}

/// Element type of a backing array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Int,
    Short,
    Byte,
}

/// Backing array of a raster
#[derive(Debug, Clone)]
pub enum Storage {
    Int(PixelBuffer<u32>),
    Short(PixelBuffer<u16>),
    Byte(PixelBuffer<u8>),
}

impl Storage {
    /// Allocate zeroed storage of the given kind.
    pub fn alloc(kind: StorageKind, len: usize) -> Self {
        match kind {
            StorageKind::Int => Self::Int(PixelBuffer::new(len)),
            StorageKind::Short => Self::Short(PixelBuffer::new(len)),
            StorageKind::Byte => Self::Byte(PixelBuffer::new(len)),
        }
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            Self::Int(_) => StorageKind::Int,
            Self::Short(_) => StorageKind::Short,
            Self::Byte(_) => StorageKind::Byte,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Int(b) => b.len(),
            Self::Short(b) => b.len(),
            Self::Byte(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity of the allocation.
    pub fn id(&self) -> StorageId {
        match self {
            Self::Int(b) => b.id(),
            Self::Short(b) => b.id(),
            Self::Byte(b) => b.id(),
        }
    }

    /// Check whether two storages are the same allocation.
    pub fn same_storage(&self, other: &Storage) -> bool {
        self.id() == other.id()
    }

    pub(crate) fn lock_read(&self) -> StorageReadGuard<'_> {
        match self {
            Self::Int(b) => StorageReadGuard::Int(b.read()),
            Self::Short(b) => StorageReadGuard::Short(b.read()),
            Self::Byte(b) => StorageReadGuard::Byte(b.read()),
        }
    }

    pub(crate) fn lock_write(&self) -> StorageWriteGuard<'_> {
        match self {
            Self::Int(b) => StorageWriteGuard::Int(b.write()),
            Self::Short(b) => StorageWriteGuard::Short(b.write()),
            Self::Byte(b) => StorageWriteGuard::Byte(b.write()),
        }
    }
}

pub(crate) enum StorageReadGuard<'a> {
    Int(RwLockReadGuard<'a, Vec<u32>>),
    Short(RwLockReadGuard<'a, Vec<u16>>),
    Byte(RwLockReadGuard<'a, Vec<u8>>),
}

impl StorageReadGuard<'_> {
    pub(crate) fn pixels(&self) -> Pixels<'_> {
        match self {
            Self::Int(g) => Pixels::Int(g),
            Self::Short(g) => Pixels::Short(g),
            Self::Byte(g) => Pixels::Byte(g),
        }
    }
}

pub(crate) enum StorageWriteGuard<'a> {
    Int(RwLockWriteGuard<'a, Vec<u32>>),
    Short(RwLockWriteGuard<'a, Vec<u16>>),
    Byte(RwLockWriteGuard<'a, Vec<u8>>),
}

impl StorageWriteGuard<'_> {
    pub(crate) fn pixels_mut(&mut self) -> PixelsMut<'_> {
        match self {
            Self::Int(g) => PixelsMut::Int(g),
            Self::Short(g) => PixelsMut::Short(g),
            Self::Byte(g) => PixelsMut::Byte(g),
        }
    }
}

/// Borrowed view of backing elements
#[derive(Clone, Copy)]
pub(crate) enum Pixels<'a> {
    Int(&'a [u32]),
    Short(&'a [u16]),
    Byte(&'a [u8]),
}

impl Pixels<'_> {
    /// Element at `idx` widened to a word.
    #[inline(always)]
    pub(crate) fn word(&self, idx: usize) -> u32 {
        match self {
            Self::Int(d) => d[idx],
            Self::Short(d) => d[idx].to_word(),
            Self::Byte(d) => d[idx].to_word(),
        }
    }
}

/// Mutably borrowed view of backing elements
pub(crate) enum PixelsMut<'a> {
    Int(&'a mut [u32]),
    Short(&'a mut [u16]),
    Byte(&'a mut [u8]),
}

impl<'a> PixelsMut<'a> {
    #[inline(always)]
    pub(crate) fn word(&self, idx: usize) -> u32 {
        match self {
            Self::Int(d) => d[idx],
            Self::Short(d) => d[idx].to_word(),
            Self::Byte(d) => d[idx].to_word(),
        }
    }

    #[inline(always)]
    pub(crate) fn set_word(&mut self, idx: usize, word: u32) {
        match self {
            Self::Int(d) => d[idx] = word,
            Self::Short(d) => d[idx] = u16::from_word(word),
            Self::Byte(d) => d[idx] = u8::from_word(word),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Int(d) => d.len(),
            Self::Short(d) => d.len(),
            Self::Byte(d) => d.len(),
        }
    }

    /// Store `word` in every element of `range`.
    pub(crate) fn fill(&mut self, range: std::ops::Range<usize>, word: u32) {
        match self {
            Self::Int(d) => d[range].fill(word),
            Self::Short(d) => d[range].fill(u16::from_word(word)),
            Self::Byte(d) => d[range].fill(u8::from_word(word)),
        }
    }

    pub(crate) fn as_pixels(&self) -> Pixels<'_> {
        match self {
            Self::Int(d) => Pixels::Int(d),
            Self::Short(d) => Pixels::Short(d),
            Self::Byte(d) => Pixels::Byte(d),
        }
    }

    /// Split into two disjoint views at element `mid`.
    pub(crate) fn split_at(self, mid: usize) -> (PixelsMut<'a>, PixelsMut<'a>) {
        match self {
            Self::Int(d) => {
                let (a, b) = d.split_at_mut(mid);
                (Self::Int(a), Self::Int(b))
            }
            Self::Short(d) => {
                let (a, b) = d.split_at_mut(mid);
                (Self::Short(a), Self::Short(b))
            }
            Self::Byte(d) => {
                let (a, b) = d.split_at_mut(mid);
                (Self::Byte(a), Self::Byte(b))
            }
        }
    }
}

/// Every structural field of a raster, for building unusual rasters.
#[derive(Debug, Clone)]
pub struct RasterParts {
    pub width: u32,
    pub height: u32,
    pub layout: SampleLayout,
    pub storage: Storage,
    /// Element index of pixel (0, 0)
    pub offset: usize,
    /// Elements per row; `None` if the host does not expose it
    pub scanline_stride: Option<usize>,
    /// Elements per pixel
    pub pixel_stride: usize,
    /// Number of data banks
    pub banks: usize,
    /// Sample model translation of a child raster
    pub translation: (i32, i32),
    pub premultiplied: bool,
}

impl RasterParts {
    /// Parts of a tightly packed single-bank raster over `storage`.
    pub fn new(width: u32, height: u32, layout: SampleLayout, storage: Storage) -> Self {
        let pixel_stride = layout.pixel_stride();
        Self {
            width,
            height,
            layout,
            storage,
            offset: 0,
            scanline_stride: Some(width as usize * pixel_stride),
            pixel_stride,
            banks: 1,
            translation: (0, 0),
            premultiplied: false,
        }
    }
}

/// Host raster handle
#[derive(Debug, Clone)]
pub struct NativeRaster {
    parts: RasterParts,
}

impl NativeRaster {
    /// Wrap arbitrary raster parts.
    ///
    /// Only the dimensions are checked here; structural validation is
    /// the accessor's job, since it decides which layouts it can serve.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn from_parts(parts: RasterParts) -> Result<Self> {
        if parts.width == 0 || parts.height == 0 {
            return Err(Error::InvalidDimension {
                width: parts.width,
                height: parts.height,
            });
        }
        Ok(Self { parts })
    }

    /// Allocate a zero-filled, tightly packed raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32, layout: SampleLayout, premultiplied: bool) -> Result<Self> {
        let len = width as usize * height as usize * layout.pixel_stride();
        let storage = Storage::alloc(layout.storage_kind(), len);
        let mut parts = RasterParts::new(width, height, layout, storage);
        parts.premultiplied = premultiplied;
        Self::from_parts(parts)
    }

    /// Allocate a packed 32-bit raster in a catalog format.
    pub fn with_format(
        width: u32,
        height: u32,
        format: PixelFormat,
        premultiplied: bool,
    ) -> Result<Self> {
        Self::new(width, height, SampleLayout::packed(format), premultiplied)
    }

    /// View a caller's packed buffer as a raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] when the addressed area does not
    /// fit in `buffer`.
    pub fn wrap_int_buffer(
        buffer: PixelBuffer<u32>,
        width: u32,
        height: u32,
        offset: usize,
        stride: usize,
        format: PixelFormat,
        premultiplied: bool,
    ) -> Result<Self> {
        let required = offset + (height as usize).saturating_sub(1) * stride + width as usize;
        let len = buffer.len();
        if required > len || stride < width as usize {
            return Err(Error::BufferTooSmall { required, len });
        }
        let mut parts = RasterParts::new(
            width,
            height,
            SampleLayout::packed(format),
            Storage::Int(buffer),
        );
        parts.offset = offset;
        parts.scanline_stride = Some(stride);
        parts.premultiplied = premultiplied;
        Self::from_parts(parts)
    }

    /// Child raster covering `rect`, sharing storage.
    ///
    /// The child carries a sample model translation, as host child
    /// rasters do.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RectOutOfBounds`] if `rect` is not inside this
    /// raster or is empty.
    pub fn child(&self, rect: Rect) -> Result<Self> {
        rect.check_within(self.width(), self.height(), "parent raster")?;
        if rect.is_empty() {
            return Err(Error::InvalidDimension {
                width: rect.w as u32,
                height: rect.h as u32,
            });
        }
        let mut parts = self.parts.clone();
        parts.width = rect.w as u32;
        parts.height = rect.h as u32;
        parts.translation = (
            self.parts.translation.0 - rect.x,
            self.parts.translation.1 - rect.y,
        );
        Ok(Self { parts })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.parts.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.parts.height
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.parts.width, self.parts.height)
    }

    #[inline]
    pub fn layout(&self) -> &SampleLayout {
        &self.parts.layout
    }

    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.parts.storage
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.parts.offset
    }

    #[inline]
    pub fn scanline_stride(&self) -> Option<usize> {
        self.parts.scanline_stride
    }

    #[inline]
    pub fn pixel_stride(&self) -> usize {
        self.parts.pixel_stride
    }

    #[inline]
    pub fn banks(&self) -> usize {
        self.parts.banks
    }

    #[inline]
    pub fn translation(&self) -> (i32, i32) {
        self.parts.translation
    }

    /// Whether stored color components are premultiplied.
    ///
    /// Always false for layouts without alpha.
    #[inline]
    pub fn is_premultiplied(&self) -> bool {
        self.parts.premultiplied && self.parts.layout.has_alpha()
    }

    /// Check whether two rasters share backing storage.
    pub fn shares_storage(&self, other: &NativeRaster) -> bool {
        self.parts.storage.same_storage(&other.parts.storage)
    }
}
