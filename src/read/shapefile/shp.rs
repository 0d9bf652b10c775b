//! Reads the header of an ESRI ".shp" Shapefile, as per
//! https://www.esri.com/library/whitepapers/pdfs/shapefile.pdf
use std::error;
use std::fmt;
use std::io;
use super::cursor::ShpCursor;

pub const SHP_HEADER_LENGTH: usize = 100;
pub const SHP_RECORD_HEADER_LENGTH: usize = 8;
pub const SHP_MAGIC_NUMBER: i32 = 9994;
pub const SHP_VERSION: i32 = 1000;

#[derive(Debug)]
pub enum ShpError {
    IOError(io::Error),
    InvalidFileCode(i32),
    TruncatedData { offset: usize, needed: usize, remaining: usize },
    UnsupportedShapeType { record_number: i32, shape_type: i32 },
}

impl error::Error for ShpError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            ShpError::IOError(ref err) => { Some(err) },
            _ => { None },
        }
    }
}

impl fmt::Display for ShpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ShpError::IOError(ref err) => { write!(f, "I/O error: {}", err) },
            ShpError::InvalidFileCode(code) => {
                write!(f, "File has wrong magic number: found {}, expected {}", code, SHP_MAGIC_NUMBER)
            },
            ShpError::TruncatedData { offset, needed, remaining } => {
                write!(f, "Truncated data at byte {}: needed {} bytes, but only {} remain", offset, needed, remaining)
            },
            ShpError::UnsupportedShapeType { record_number, shape_type } => {
                match ShpShapeType::with_i32(shape_type) {
                    Some(known) => write!(f, "Record number {} has unsupported shape type {:?} ({})", record_number, known, shape_type),
                    None => write!(f, "Record number {} has nonexistent shape type {}", record_number, shape_type),
                }
            },
        }
    }
}

impl From<io::Error> for ShpError {
    fn from(err: io::Error) -> ShpError {
        ShpError::IOError(err)
    }
}

#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum ShpShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShpShapeType {
    pub fn with_i32(i: i32) -> Option<ShpShapeType> {
        match i {
            0  => Some(ShpShapeType::Null),
            1  => Some(ShpShapeType::Point),
            3  => Some(ShpShapeType::PolyLine),
            5  => Some(ShpShapeType::Polygon),
            8  => Some(ShpShapeType::MultiPoint),
            11 => Some(ShpShapeType::PointZ),
            13 => Some(ShpShapeType::PolyLineZ),
            15 => Some(ShpShapeType::PolygonZ),
            18 => Some(ShpShapeType::MultiPointZ),
            21 => Some(ShpShapeType::PointM),
            23 => Some(ShpShapeType::PolyLineM),
            25 => Some(ShpShapeType::PolygonM),
            28 => Some(ShpShapeType::MultiPointM),
            31 => Some(ShpShapeType::MultiPatch),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match *self {
            ShpShapeType::Null => 0,
            ShpShapeType::Point => 1,
            ShpShapeType::PolyLine => 3,
            ShpShapeType::Polygon => 5,
            ShpShapeType::MultiPoint => 8,
            ShpShapeType::PointZ => 11,
            ShpShapeType::PolyLineZ => 13,
            ShpShapeType::PolygonZ => 15,
            ShpShapeType::MultiPointZ => 18,
            ShpShapeType::PointM => 21,
            ShpShapeType::PolyLineM => 23,
            ShpShapeType::PolygonM => 25,
            ShpShapeType::MultiPointM => 28,
            ShpShapeType::MultiPatch => 31,
        }
    }
}

/// xmin, ymin, xmax, ymax
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct ShpBoundingBox(pub f64, pub f64, pub f64, pub f64);

impl ShpBoundingBox {
    pub fn read(cursor: &mut ShpCursor) -> Result<ShpBoundingBox, ShpError> {
        Ok(ShpBoundingBox(
            cursor.read_f64_le()?,
            cursor.read_f64_le()?,
            cursor.read_f64_le()?,
            cursor.read_f64_le()?,
        ))
    }

    pub fn to_array(&self) -> [f64; 4] {
        [ self.0, self.1, self.2, self.3 ]
    }
}

impl fmt::Display for ShpBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{},{},{},{}]", self.0, self.1, self.2, self.3)
    }
}

#[derive(Debug,Copy,Clone,PartialEq,PartialOrd)]
pub struct ShpPoint(pub f64, pub f64);

impl ShpPoint {
    pub fn read(cursor: &mut ShpCursor) -> Result<ShpPoint, ShpError> {
        Ok(ShpPoint(cursor.read_f64_le()?, cursor.read_f64_le()?))
    }
}

impl fmt::Display for ShpPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}

#[derive(Debug,Copy,Clone,PartialEq)]
pub struct ShpHeader {
    pub file_code: i32,
    /// What the header claims the file length is. Records are read until the
    /// buffer runs out regardless.
    pub file_n_bytes: usize,
    pub version: i32,
    /// Raw shape type code. Each record carries its own code, so this one is
    /// informational.
    pub shape_type: i32,
    pub bounding_box: ShpBoundingBox,
}

impl ShpHeader {
    pub fn shape_type(&self) -> Option<ShpShapeType> {
        ShpShapeType::with_i32(self.shape_type)
    }
}

/// Reads the first 100 bytes of the file.
///
/// Side-effect: advances the cursor 100 bytes.
///
/// Only the magic number is checked. An unexpected version or shape type is
/// passed through: records are decoded by their own type codes.
pub fn read_shp_header(cursor: &mut ShpCursor) -> Result<ShpHeader, ShpError> {
    let mut header = cursor.slice(SHP_HEADER_LENGTH)?;

    let file_code = header.read_i32_be()?;
    if file_code != SHP_MAGIC_NUMBER {
        return Err(ShpError::InvalidFileCode(file_code));
    }

    header.skip(20)?; // five unused big-endian ints
    let file_len = header.read_i32_be()?;
    let version = header.read_i32_le()?;
    let shape_type = header.read_i32_le()?;
    let bounding_box = ShpBoundingBox::read(&mut header)?;
    header.skip(32)?; // Z range, M range

    if version != SHP_VERSION {
        warn!("File has version {}, expected {}; reading anyway", version, SHP_VERSION);
    }

    Ok(ShpHeader {
        file_code: file_code,
        file_n_bytes: if file_len > 0 { file_len as usize * 2 } else { 0 },
        version: version,
        shape_type: shape_type,
        bounding_box: bounding_box,
    })
}

#[cfg(test)]
pub mod test {
    use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
    use read::shapefile::cursor::ShpCursor;
    use super::*;

    /// Builds a 100-byte header. `file_len` is in 16-bit words.
    pub fn header_bytes(file_code: i32, file_len: i32, version: i32, shape_type: i32, bbox: [f64; 4]) -> Vec<u8> {
        let mut buf = vec![];
        buf.write_i32::<BigEndian>(file_code).unwrap();
        for _ in 0..5 {
            buf.write_i32::<BigEndian>(0).unwrap();
        }
        buf.write_i32::<BigEndian>(file_len).unwrap();
        buf.write_i32::<LittleEndian>(version).unwrap();
        buf.write_i32::<LittleEndian>(shape_type).unwrap();
        for v in bbox.iter() {
            buf.write_f64::<LittleEndian>(*v).unwrap();
        }
        for _ in 0..4 {
            buf.write_f64::<LittleEndian>(0.).unwrap();
        }
        buf
    }

    #[test]
    fn reads_header() {
        let buf = header_bytes(9994, 50, 1000, 1, [ 1., 2., 17., 18. ]);
        let mut cursor = ShpCursor::new(&buf);
        let header = read_shp_header(&mut cursor).unwrap();

        assert_eq!(9994, header.file_code);
        assert_eq!(1000, header.version);
        assert_eq!(1, header.shape_type);
        assert_eq!(Some(ShpShapeType::Point), header.shape_type());
        assert_eq!([ 1., 2., 17., 18. ], header.bounding_box.to_array());
        assert_eq!(100, header.file_n_bytes);
        assert_eq!(100, cursor.position());
    }

    #[test]
    fn wrong_magic_number() {
        let buf = header_bytes(9995, 50, 1000, 1, [ 0.; 4 ]);
        match read_shp_header(&mut ShpCursor::new(&buf)) {
            Err(ShpError::InvalidFileCode(9995)) => {},
            other => panic!("expected InvalidFileCode, got {:?}", other),
        }
    }

    #[test]
    fn unexpected_version_passes_through() {
        let buf = header_bytes(9994, 50, 999, 5, [ 0.; 4 ]);
        let header = read_shp_header(&mut ShpCursor::new(&buf)).unwrap();
        assert_eq!(999, header.version);
        assert_eq!(Some(ShpShapeType::Polygon), header.shape_type());
    }

    #[test]
    fn unknown_header_shape_type_passes_through() {
        let buf = header_bytes(9994, 50, 1000, 42, [ 0.; 4 ]);
        let header = read_shp_header(&mut ShpCursor::new(&buf)).unwrap();
        assert_eq!(42, header.shape_type);
        assert_eq!(None, header.shape_type());
    }

    #[test]
    fn short_header_is_truncated() {
        let buf = header_bytes(9994, 50, 1000, 1, [ 0.; 4 ]);
        match read_shp_header(&mut ShpCursor::new(&buf[..99])) {
            Err(ShpError::TruncatedData { needed: 100, remaining: 99, .. }) => {},
            other => panic!("expected TruncatedData, got {:?}", other),
        }
    }

    #[test]
    fn shape_type_codes() {
        for code in [ 0, 1, 3, 5, 8, 11, 13, 15, 18, 21, 23, 25, 28, 31 ].iter() {
            assert_eq!(*code, ShpShapeType::with_i32(*code).unwrap().code());
        }
        assert_eq!(None, ShpShapeType::with_i32(2));
    }
}
