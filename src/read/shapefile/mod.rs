//! Reads the geometry in ESRI ".shp" files.
//!
//! A ".shp" file is a 100-byte header followed by records. Each record is
//! either a Null (returned as `None`, so record positions line up with the
//! ".dbf" rows) or one geometry: Point, MultiPoint, PolyLine, Polygon, or the
//! measured "M" flavour of any of them.
//!
//! There are things this module _doesn't_ read:
//!
//! * The ".dbf" attributes and ".shx" index. `read()` accepts an encoding so
//!   callers can pass the one they'll use for ".dbf" strings, but the
//!   geometry doesn't depend on it.
//! * The _projection_. Points are returned as raw `f64` pairs.
//! * Z ("elevation") shapes. They fail with `ShpError::UnsupportedShapeType`.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use shpread::read::shapefile;
//!
//! let (header, records) = shapefile::read_utf8(Path::new("roads.shp")).unwrap();
//!
//! println!("{:?} in {}", header.shape_type(), header.bounding_box);
//! for record in records {
//!     match record {
//!         None => println!("null"),
//!         Some(shape) => println!("{}", shape),
//!     }
//! }
//! ```
//!
//! Or from bytes you've already loaded:
//!
//! ```no_run
//! use shpread::read::shapefile;
//!
//! let bytes = std::fs::read("roads.shp").unwrap();
//! let (header, records) = shapefile::read_bytes(&bytes).unwrap();
//! assert_eq!(9994, header.file_code);
//! ```

use std::fs;
use std::io::Read;
use std::path::Path;
use encoding;

pub mod cursor;
pub mod geometry;
pub mod record;
pub mod shp;

pub use self::cursor::ShpCursor;
pub use self::geometry::{ShpMeasures, ShpMultiPoint, ShpPointM, ShpPoly, ShpRange, ShpRecord};
pub use self::shp::{ShpBoundingBox, ShpError, ShpHeader, ShpPoint, ShpShapeType};

/// Decodes a whole ".shp" file that's already in memory.
///
/// Returns the header and one entry per record, in file order. Null records
/// are `None`. Any error aborts the read: there are no partial results.
pub fn read_bytes(bytes: &[u8]) -> Result<(ShpHeader, Vec<Option<ShpRecord>>), ShpError> {
    let mut cursor = ShpCursor::new(bytes);
    let header = shp::read_shp_header(&mut cursor)?;
    debug!("Read .shp header: shape type {}, version {}, box {}", header.shape_type, header.version, header.bounding_box);

    if header.file_n_bytes != bytes.len() {
        warn!("The .shp header says the file is {} bytes long, but it's {} bytes", header.file_n_bytes, bytes.len());
    }

    let mut records = Vec::new();
    for result in record::ShpRecordIter::new(cursor) {
        records.push(result?);
    }
    debug!("Read {} .shp records", records.len());

    Ok((header, records))
}

/// Reads and decodes the ".shp" file at `path`.
///
/// `encoding` is the character set of the accompanying ".dbf" attributes. It
/// is accepted so callers can pass one value around for the whole shapefile;
/// it never changes how geometry decodes.
pub fn read(path: &Path, encoding: Option<encoding::EncodingRef>) -> Result<(ShpHeader, Vec<Option<ShpRecord>>), ShpError> {
    if let Some(enc) = encoding {
        debug!("Reading {} (attribute encoding {})", path.display(), enc.name());
    } else {
        debug!("Reading {}", path.display());
    }

    let mut bytes = Vec::new();
    fs::File::open(path)?.read_to_end(&mut bytes)?;
    read_bytes(&bytes)
}

pub fn read_ascii(path: &Path) -> Result<(ShpHeader, Vec<Option<ShpRecord>>), ShpError> {
    read(path, Some(encoding::all::ASCII))
}

pub fn read_utf8(path: &Path) -> Result<(ShpHeader, Vec<Option<ShpRecord>>), ShpError> {
    read(path, Some(encoding::all::UTF_8))
}

pub fn read_windows1252(path: &Path) -> Result<(ShpHeader, Vec<Option<ShpRecord>>), ShpError> {
    read(path, Some(encoding::all::WINDOWS_1252))
}

/// Looks up an encoding by WHATWG label, e.g. "utf-8" or "latin1".
pub fn encoding_from_label(label: &str) -> Option<encoding::EncodingRef> {
    encoding::label::encoding_from_whatwg_label(label)
}
