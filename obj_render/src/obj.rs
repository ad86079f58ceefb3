use std::path::{Path, PathBuf};

use itertools::Itertools;
use rasterizer::math_prelude::*;
use rasterizer::{Face, FaceVertex, Model};

#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("`{0}` is missing a required field")]
    MissingField(&'static str),
    #[error("invalid number `{0}`")]
    InvalidFloat(String),
    #[error("invalid index `{0}`")]
    InvalidIndex(String),
    #[error("index {index} is out of range, {count} {element} elements defined so far")]
    IndexOutOfRange {
        index: i64,
        count: usize,
        element: &'static str,
    },
    #[error("face has {0} vertices, at least 3 are required")]
    TooFewVertices(usize),
}

pub fn read_obj<P: AsRef<Path>>(path: P) -> Result<Model, ObjError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ObjError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model = parse_obj(&contents)?;
    tracing::info!(
        path = %path.display(),
        vertices = model.positions.len(),
        faces = model.faces.len(),
        "loaded model"
    );
    Ok(model)
}

/// Parses the `v`, `vt`, `vn` and `f` statements of a Wavefront OBJ file.
///
/// Faces with more than three corners are split into a triangle fan around
/// their first corner. Other statements are ignored.
pub fn parse_obj(contents: &str) -> Result<Model, ObjError> {
    let mut model = Model::default();

    for (number, line) in contents.lines().enumerate() {
        parse_line(&mut model, line).map_err(|kind| ObjError::Parse {
            line: number + 1,
            kind,
        })?;
    }

    Ok(model)
}

fn parse_line(model: &mut Model, line: &str) -> Result<(), ParseErrorKind> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("v") => {
            let x = required_float(parts.next(), "v")?;
            let y = required_float(parts.next(), "v")?;
            let z = required_float(parts.next(), "v")?;
            let w = optional_float(parts.next())?.unwrap_or(1.0);
            model.positions.push(Vec4::new(x, y, z, w));
        }
        Some("vt") => {
            let u = required_float(parts.next(), "vt")?;
            let v = optional_float(parts.next())?.unwrap_or(0.0);
            let w = optional_float(parts.next())?.unwrap_or(0.0);
            model.texcoords.push(Vec3::new(u, v, w));
        }
        Some("vn") => {
            let x = required_float(parts.next(), "vn")?;
            let y = required_float(parts.next(), "vn")?;
            let z = required_float(parts.next(), "vn")?;
            model.normals.push(Vec3::new(x, y, z));
        }
        Some("f") => {
            let corners = parts
                .map(|part| parse_face_vertex(model, part))
                .collect::<Result<Vec<_>, _>>()?;
            if corners.len() < 3 {
                return Err(ParseErrorKind::TooFewVertices(corners.len()));
            }
            let first = corners[0];
            model.faces.extend(
                corners[1..]
                    .iter()
                    .tuple_windows()
                    .map(|(&second, &third)| Face {
                        vertices: [first, second, third],
                    }),
            );
        }
        _ => {}
    }
    Ok(())
}

// `v`, `v/vt`, `v//vn` or `v/vt/vn`
fn parse_face_vertex(model: &Model, part: &str) -> Result<FaceVertex, ParseErrorKind> {
    let mut indices = part.split('/');
    let position = match indices.next() {
        Some(index) if !index.is_empty() => {
            resolve_index(index, model.positions.len(), "position")?
        }
        _ => return Err(ParseErrorKind::MissingField("f")),
    };
    let texcoord = match indices.next() {
        Some(index) if !index.is_empty() => {
            Some(resolve_index(index, model.texcoords.len(), "texture coordinate")?)
        }
        _ => None,
    };
    let normal = match indices.next() {
        Some(index) if !index.is_empty() => {
            Some(resolve_index(index, model.normals.len(), "normal")?)
        }
        _ => None,
    };
    Ok(FaceVertex::new(position, texcoord, normal))
}

/// Turns a 1-based (or negative, relative to the end) index into a 0-based one.
fn resolve_index(
    token: &str,
    count: usize,
    element: &'static str,
) -> Result<usize, ParseErrorKind> {
    let index: i64 = token
        .parse()
        .map_err(|_| ParseErrorKind::InvalidIndex(token.to_string()))?;
    let resolved = match index {
        0 => None,
        i if i > 0 => Some(i - 1),
        i => Some(count as i64 + i),
    };
    match resolved {
        Some(r) if r >= 0 && (r as usize) < count => Ok(r as usize),
        _ => Err(ParseErrorKind::IndexOutOfRange {
            index,
            count,
            element,
        }),
    }
}

fn required_float(token: Option<&str>, statement: &'static str) -> Result<f32, ParseErrorKind> {
    let token = token.ok_or(ParseErrorKind::MissingField(statement))?;
    parse_float(token)
}

fn optional_float(token: Option<&str>) -> Result<Option<f32>, ParseErrorKind> {
    token.map(parse_float).transpose()
}

fn parse_float(token: &str) -> Result<f32, ParseErrorKind> {
    token
        .parse()
        .map_err(|_| ParseErrorKind::InvalidFloat(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error(contents: &str) -> (usize, ParseErrorKind) {
        match parse_obj(contents) {
            Err(ObjError::Parse { line, kind }) => (line, kind),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn single_triangle() {
        let model = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(model.positions.len(), 3);
        assert_eq!(model.faces.len(), 1);
        let indices = model.faces[0].vertices.map(|v| v.position);
        assert_eq!(indices, [0, 1, 2]);
        assert!(model.faces[0]
            .vertices
            .iter()
            .all(|v| v.texcoord.is_none() && v.normal.is_none()));
        assert_eq!(model.positions[1], Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn vertex_reference_forms() {
        let model = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             vt 0.5\nvt 0.1 0.2 0.3\n\
             vn 0 0 1\n\
             f 1/1 2/2 3/1\n\
             f 1//1 2//1 3//1\n\
             f 1/2/1 2/1/1 3/2/1\n",
        )
        .unwrap();
        assert_eq!(
            model.texcoords,
            vec![Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.1, 0.2, 0.3)]
        );

        let [a, b, c] = [model.faces[0], model.faces[1], model.faces[2]];
        assert_eq!(a.vertices[1], FaceVertex::new(1, Some(1), None));
        assert_eq!(b.vertices[2], FaceVertex::new(2, None, Some(0)));
        assert_eq!(c.vertices[0], FaceVertex::new(0, Some(1), Some(0)));
    }

    #[test]
    fn optional_w_and_comments() {
        let model = parse_obj(
            "# a comment\n\n  v 1 2 3 0.5  \no object\ng group\nusemtl none\nv 4 5 6\n",
        )
        .unwrap();
        assert_eq!(
            model.positions,
            vec![Vec4::new(1.0, 2.0, 3.0, 0.5), Vec4::new(4.0, 5.0, 6.0, 1.0)]
        );
        assert!(model.faces.is_empty());
    }

    #[test]
    fn polygons_become_triangle_fans() {
        let model = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv -1 1 0\n\
             f 1 2 3 4 5\n",
        )
        .unwrap();
        let faces: Vec<[usize; 3]> = model
            .faces
            .iter()
            .map(|f| f.vertices.map(|v| v.position))
            .collect();
        assert_eq!(faces, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let model = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\n\
             f -3//-1 -2//-1 -1//-1\n\
             v 5 5 5\n\
             f 1 -1 -2\n",
        )
        .unwrap();
        assert_eq!(model.faces[0].vertices.map(|v| v.position), [0, 1, 2]);
        assert_eq!(model.faces[0].vertices[0].normal, Some(0));
        assert_eq!(model.faces[1].vertices.map(|v| v.position), [0, 3, 2]);
    }

    #[test]
    fn malformed_lines_report_their_line() {
        assert_eq!(
            parse_error("v 0 0 0\nv 1 0\n"),
            (2, ParseErrorKind::MissingField("v"))
        );
        assert_eq!(
            parse_error("v 0 zero 0\n"),
            (1, ParseErrorKind::InvalidFloat("zero".to_string()))
        );
        assert_eq!(
            parse_error("vn 1 1\n"),
            (1, ParseErrorKind::MissingField("vn"))
        );
        assert_eq!(parse_error("vt\n"), (1, ParseErrorKind::MissingField("vt")));
        assert_eq!(
            parse_error("v 0 0 0\nv 1 0 0\nf 1 2\n"),
            (3, ParseErrorKind::TooFewVertices(2))
        );
        assert_eq!(
            parse_error("v 0 0 0\nf 1 a 1\n"),
            (2, ParseErrorKind::InvalidIndex("a".to_string()))
        );
        assert_eq!(
            parse_error("v 0 0 0\nf /1 1 1\n"),
            (2, ParseErrorKind::MissingField("f"))
        );
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let base = "v 0 0 0\nv 1 0 0\nv 0 1 0\n";
        let cases = [
            ("f 1 2 4\n", 4, "position"),
            ("f 0 1 2\n", 0, "position"),
            ("f -4 1 2\n", -4, "position"),
            ("f 1/1 2/1 3/1\n", 1, "texture coordinate"),
            ("f 1//1 2//1 3//1\n", 1, "normal"),
        ];
        for (face, index, element) in cases {
            let count = if element == "position" { 3 } else { 0 };
            assert_eq!(
                parse_error(&format!("{base}{face}")),
                (
                    4,
                    ParseErrorKind::IndexOutOfRange {
                        index,
                        count,
                        element
                    }
                )
            );
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_obj("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, ObjError::Io { .. }));
    }
}
