//! Face record parsing.
//!
//! A face record is one line of a brush block:
//!
//! ```text
//! ( 128 -32 0 ) ( 96 -16 0 ) ( 224 112 0 ) wswamp2_1 0 0 0 1.000000 1.000000
//! ```
//!
//! Only the three coordinate triples matter for geometry. The first token
//! after them is the texture tag; everything else is ignored.

use nalgebra::Point3;

use crate::error::ParseError;
use crate::plane::Plane;

/// One parsed face of a brush.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceRecord {
    pub plane: Plane,
    /// Texture name as written in the record, empty if missing.
    pub texture: String,
}

/// Parses the plane of a face record.
pub fn parse_plane(record: &str, epsilon: f64) -> Result<Plane, ParseError> {
    let (points, _) = parse_points(record)?;
    Plane::from_three_points(points[0], points[1], points[2], epsilon)
}

/// Parses a face record into its plane and texture tag.
pub fn parse_face(record: &str, epsilon: f64) -> Result<FaceRecord, ParseError> {
    let (points, rest) = parse_points(record)?;
    let plane = Plane::from_three_points(points[0], points[1], points[2], epsilon)?;
    Ok(FaceRecord {
        plane,
        texture: texture_tag(rest).to_owned(),
    })
}

/// Parses every face line of a brush block.
///
/// Blank lines and `//` comments are skipped. The first face that fails
/// fails the whole brush; the error records which face it was.
pub fn parse_brush(text: &str, epsilon: f64) -> Result<Vec<FaceRecord>, ParseError> {
    face_lines(text)
        .enumerate()
        .map(|(line, record)| {
            parse_face(record, epsilon).map_err(|source| ParseError::Face {
                line,
                source: Box::new(source),
            })
        })
        .collect()
}

/// Iterates over the face lines of a brush block.
pub fn face_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
}

/// Returns the first whitespace-delimited token of the text after the last
/// coordinate triple.
fn texture_tag(rest: &str) -> &str {
    rest.split_whitespace().next().unwrap_or("")
}

/// Reads the three parenthesized points, returning them together with the
/// unparsed remainder of the record.
fn parse_points(record: &str) -> Result<([Point3<f64>; 3], &str), ParseError> {
    let mut points = [Point3::origin(); 3];
    let mut rest = record;

    for (i, point) in points.iter_mut().enumerate() {
        let open = rest.find('(').ok_or_else(|| {
            ParseError::MalformedCoordinates(format!("expected 3 points, found {i}"))
        })?;
        let close = rest[open..]
            .find(')')
            .map(|offset| open + offset)
            .ok_or_else(|| {
                ParseError::MalformedCoordinates(format!("point {} is not closed", i + 1))
            })?;

        *point = parse_triple(&rest[open + 1..close])?;
        rest = &rest[close + 1..];
    }

    Ok((points, rest))
}

fn parse_triple(text: &str) -> Result<Point3<f64>, ParseError> {
    let mut coords = [0.0; 3];
    let mut tokens = text.split_whitespace();

    for coord in &mut coords {
        let token = tokens.next().ok_or_else(|| {
            ParseError::MalformedCoordinates(format!("expected 3 coordinates in '({text})'"))
        })?;
        *coord = token.parse::<f64>().map_err(|_| {
            ParseError::MalformedCoordinates(format!("'{token}' is not a number"))
        })?;
        if !coord.is_finite() {
            return Err(ParseError::MalformedCoordinates(format!(
                "'{token}' is not a finite number"
            )));
        }
    }

    if let Some(extra) = tokens.next() {
        return Err(ParseError::MalformedCoordinates(format!(
            "unexpected '{extra}' in '({text})'"
        )));
    }

    Ok(Point3::new(coords[0], coords[1], coords[2]))
}
