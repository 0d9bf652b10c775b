//! Decodes the content of a single ".shp" record.
//!
//! Every record starts with its own little-endian shape type code, and that
//! code (not the file header's) picks the decoder. Measured multi-point,
//! polyline and polygon records may omit their measures: the format has no
//! flag for this, so we compare the record's content length against what the
//! unmeasured geometry needs.
use std::cmp;
use std::fmt;
use itertools::Itertools;
use super::cursor::ShpCursor;
use super::shp::{ShpBoundingBox, ShpError, ShpPoint, ShpShapeType};

const SHP_POINT_LENGTH: usize = 16;
const SHP_F64_LENGTH: usize = 8;
const SHP_I32_LENGTH: usize = 4;

/// A point with a measure: x, y, m.
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct ShpPointM(pub f64, pub f64, pub f64);

/// mmin, mmax
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct ShpRange(pub f64, pub f64);

/// One measure per point, in point order.
#[derive(Debug,Clone,PartialEq)]
pub struct ShpMeasures {
    pub range: ShpRange,
    pub values: Box<[f64]>,
}

#[derive(Debug,Clone,PartialEq)]
pub struct ShpMultiPoint {
    pub bounding_box: ShpBoundingBox,
    pub points: Box<[ShpPoint]>,
    /// Always `None` for an unmeasured MultiPoint.
    pub measures: Option<ShpMeasures>,
}

/// PolyLine or Polygon geometry: a run of points cut into parts.
#[derive(Debug,Clone,PartialEq)]
pub struct ShpPoly {
    pub bounding_box: ShpBoundingBox,
    /// Index into `points` where each part starts. The first is 0.
    pub parts: Box<[usize]>,
    pub points: Box<[ShpPoint]>,
    /// Always `None` for an unmeasured PolyLine or Polygon.
    pub measures: Option<ShpMeasures>,
}

impl ShpPoly {
    /// Iterates over each part's points: from its start index up to the next
    /// part's start, or to the end for the last part.
    ///
    /// Part indices come straight from the file; ones past the end of
    /// `points` yield short or empty slices instead of panicking.
    pub fn rings<'a>(&'a self) -> impl Iterator<Item=&'a [ShpPoint]> + 'a {
        let n_points = self.points.len();
        self.parts.iter()
            .cloned()
            .chain(Some(n_points))
            .tuple_windows::<(usize, usize)>()
            .map(move |(start, end)| {
                let start = cmp::min(start, n_points);
                let end = cmp::min(cmp::max(start, end), n_points);
                &self.points[start .. end]
            })
    }
}

/// A decoded non-null record. Null records are `None` in the record list.
#[derive(Debug,Clone,PartialEq)]
pub enum ShpRecord {
    Point(ShpPoint),
    PointM(ShpPointM),
    MultiPoint(ShpMultiPoint),
    MultiPointM(ShpMultiPoint),
    PolyLine(ShpPoly),
    Polygon(ShpPoly),
    PolyLineM(ShpPoly),
    PolygonM(ShpPoly),
}

impl ShpRecord {
    pub fn shape_type(&self) -> ShpShapeType {
        match *self {
            ShpRecord::Point(_) => ShpShapeType::Point,
            ShpRecord::PointM(_) => ShpShapeType::PointM,
            ShpRecord::MultiPoint(_) => ShpShapeType::MultiPoint,
            ShpRecord::MultiPointM(_) => ShpShapeType::MultiPointM,
            ShpRecord::PolyLine(_) => ShpShapeType::PolyLine,
            ShpRecord::Polygon(_) => ShpShapeType::Polygon,
            ShpRecord::PolyLineM(_) => ShpShapeType::PolyLineM,
            ShpRecord::PolygonM(_) => ShpShapeType::PolygonM,
        }
    }

    pub fn bounding_box(&self) -> Option<ShpBoundingBox> {
        match *self {
            ShpRecord::Point(_) | ShpRecord::PointM(_) => None,
            ShpRecord::MultiPoint(ref mp) | ShpRecord::MultiPointM(ref mp) => Some(mp.bounding_box),
            ShpRecord::PolyLine(ref p) | ShpRecord::Polygon(ref p)
                | ShpRecord::PolyLineM(ref p) | ShpRecord::PolygonM(ref p) => Some(p.bounding_box),
        }
    }

    pub fn measures(&self) -> Option<&ShpMeasures> {
        match *self {
            ShpRecord::MultiPointM(ref mp) => mp.measures.as_ref(),
            ShpRecord::PolyLineM(ref p) | ShpRecord::PolygonM(ref p) => p.measures.as_ref(),
            _ => None,
        }
    }
}

struct DisplayList<'a, T: 'a>(&'a [T]);

impl<'a, T: fmt::Display> fmt::Display for DisplayList<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }
}

fn write_measures(f: &mut fmt::Formatter, measures: &Option<ShpMeasures>) -> fmt::Result {
    match *measures {
        None => Ok(()),
        Some(ref m) => write!(f, ", mrange:[{},{}], measures:{}", m.range.0, m.range.1, DisplayList(&m.values)),
    }
}

impl fmt::Display for ShpRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}(", self.shape_type())?;
        match *self {
            ShpRecord::Point(p) => write!(f, "{}", p)?,
            ShpRecord::PointM(ShpPointM(x, y, m)) => write!(f, "({},{}), m:{}", x, y, m)?,
            ShpRecord::MultiPoint(ref mp) | ShpRecord::MultiPointM(ref mp) => {
                write!(f, "box:{}, points:{}", mp.bounding_box, DisplayList(&mp.points))?;
                write_measures(f, &mp.measures)?;
            },
            ShpRecord::PolyLine(ref p) | ShpRecord::Polygon(ref p)
                | ShpRecord::PolyLineM(ref p) | ShpRecord::PolygonM(ref p) => {
                write!(f, "box:{}, parts:{}, points:{}", p.bounding_box, DisplayList(&p.parts), DisplayList(&p.points))?;
                write_measures(f, &p.measures)?;
            },
        }
        write!(f, ")")
    }
}

/// Reads a count field. Counts are unsigned in practice; a negative one turns
/// into a count so large that the following read fails as truncated.
fn read_count(cursor: &mut ShpCursor) -> Result<usize, ShpError> {
    cursor.read_i32_le().map(|n| n as u32 as usize)
}

/// Fails before allocating if `count` items of `item_len` bytes can't fit.
fn require_items(cursor: &ShpCursor, count: usize, item_len: usize) -> Result<(), ShpError> {
    cursor.require(count.checked_mul(item_len).unwrap_or(usize::max_value()))
}

fn read_points(cursor: &mut ShpCursor, n_points: usize) -> Result<Box<[ShpPoint]>, ShpError> {
    require_items(cursor, n_points, SHP_POINT_LENGTH)?;
    let mut points = Vec::<ShpPoint>::with_capacity(n_points);
    for _ in 0..n_points {
        points.push(ShpPoint::read(cursor)?);
    }
    Ok(points.into_boxed_slice())
}

/// Reads the optional M block that trails measured geometry.
///
/// `unmeasured_len` is the byte length of the record content (shape type
/// included) without measures. If the record is no longer than that, it has
/// no measures.
fn read_measures(cursor: &mut ShpCursor, n_points: usize, unmeasured_len: usize) -> Result<Option<ShpMeasures>, ShpError> {
    if cursor.len() <= unmeasured_len {
        trace!("Record at byte {} has {} bytes and no measures", cursor.offset(), cursor.len());
        return Ok(None);
    }

    let range = ShpRange(cursor.read_f64_le()?, cursor.read_f64_le()?);
    require_items(cursor, n_points, SHP_F64_LENGTH)?;
    let mut values = Vec::<f64>::with_capacity(n_points);
    for _ in 0..n_points {
        values.push(cursor.read_f64_le()?);
    }

    Ok(Some(ShpMeasures {
        range: range,
        values: values.into_boxed_slice(),
    }))
}

fn read_multi_point(cursor: &mut ShpCursor, measured: bool) -> Result<ShpMultiPoint, ShpError> {
    let bounding_box = ShpBoundingBox::read(cursor)?;
    let n_points = read_count(cursor)?;
    let points = read_points(cursor, n_points)?;

    let measures = if measured {
        let unmeasured_len = SHP_I32_LENGTH + 4 * SHP_F64_LENGTH + SHP_I32_LENGTH + n_points * SHP_POINT_LENGTH;
        read_measures(cursor, n_points, unmeasured_len)?
    } else {
        None
    };

    Ok(ShpMultiPoint {
        bounding_box: bounding_box,
        points: points,
        measures: measures,
    })
}

fn read_poly(cursor: &mut ShpCursor, measured: bool) -> Result<ShpPoly, ShpError> {
    let bounding_box = ShpBoundingBox::read(cursor)?;
    let n_parts = read_count(cursor)?;
    let n_points = read_count(cursor)?;

    require_items(cursor, n_parts, SHP_I32_LENGTH)?;
    let mut parts = Vec::<usize>::with_capacity(n_parts);
    for _ in 0..n_parts {
        parts.push(read_count(cursor)?);
    }

    let points = read_points(cursor, n_points)?;

    let measures = if measured {
        let unmeasured_len = SHP_I32_LENGTH + 4 * SHP_F64_LENGTH + 2 * SHP_I32_LENGTH
            + n_parts * SHP_I32_LENGTH + n_points * SHP_POINT_LENGTH;
        read_measures(cursor, n_points, unmeasured_len)?
    } else {
        None
    };

    Ok(ShpPoly {
        bounding_box: bounding_box,
        parts: parts.into_boxed_slice(),
        points: points,
        measures: measures,
    })
}

/// Decodes one record's content. `cursor` covers exactly the record's
/// content, starting at its shape type code.
///
/// Returns `Ok(None)` for a Null record.
pub fn read_shp_record(cursor: &mut ShpCursor, record_number: i32) -> Result<Option<ShpRecord>, ShpError> {
    let shape_type = cursor.read_i32_le()?;

    let record = match ShpShapeType::with_i32(shape_type) {
        Some(ShpShapeType::Null) => None,
        Some(ShpShapeType::Point) => Some(ShpRecord::Point(ShpPoint::read(cursor)?)),
        Some(ShpShapeType::PointM) => {
            Some(ShpRecord::PointM(ShpPointM(cursor.read_f64_le()?, cursor.read_f64_le()?, cursor.read_f64_le()?)))
        },
        Some(ShpShapeType::MultiPoint) => Some(ShpRecord::MultiPoint(read_multi_point(cursor, false)?)),
        Some(ShpShapeType::MultiPointM) => Some(ShpRecord::MultiPointM(read_multi_point(cursor, true)?)),
        Some(ShpShapeType::PolyLine) => Some(ShpRecord::PolyLine(read_poly(cursor, false)?)),
        Some(ShpShapeType::Polygon) => Some(ShpRecord::Polygon(read_poly(cursor, false)?)),
        Some(ShpShapeType::PolyLineM) => Some(ShpRecord::PolyLineM(read_poly(cursor, true)?)),
        Some(ShpShapeType::PolygonM) => Some(ShpRecord::PolygonM(read_poly(cursor, true)?)),
        Some(ShpShapeType::PointZ)
            | Some(ShpShapeType::PolyLineZ)
            | Some(ShpShapeType::PolygonZ)
            | Some(ShpShapeType::MultiPointZ)
            | Some(ShpShapeType::MultiPatch)
            | None => {
            return Err(ShpError::UnsupportedShapeType {
                record_number: record_number,
                shape_type: shape_type,
            });
        },
    };

    Ok(record)
}
