use geo::{Coord, LineString};

/// planar length of a linestring in working (projected) meters.
pub fn length(ls: &LineString<f64>) -> f64 {
    ls.lines()
        .map(|l| {
            let d = l.delta();
            (d.x * d.x + d.y * d.y).sqrt()
        })
        .sum()
}

/// sample points along a linestring at a fixed interval, starting at the
/// first vertex and always including the final vertex.
pub fn points_along(ls: &LineString<f64>, interval: f64) -> Vec<Coord<f64>> {
    let mut points = vec![];
    let Some(first) = ls.0.first() else {
        return points;
    };
    points.push(*first);

    let mut next_distance = interval;
    let mut traveled = 0.0;
    for line in ls.lines() {
        let d = line.delta();
        let seg_len = (d.x * d.x + d.y * d.y).sqrt();
        if seg_len == 0.0 {
            continue;
        }
        while next_distance <= traveled + seg_len {
            let t = (next_distance - traveled) / seg_len;
            points.push(Coord {
                x: line.start.x + t * d.x,
                y: line.start.y + t * d.y,
            });
            next_distance += interval;
        }
        traveled += seg_len;
    }

    if let Some(last) = ls.0.last() {
        match points.last() {
            Some(p) if p == last => {}
            _ => points.push(*last),
        }
    }
    points
}

fn point_to_segment_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let ab = Coord {
        x: b.x - a.x,
        y: b.y - a.y,
    };
    let ap = Coord {
        x: p.x - a.x,
        y: p.y - a.y,
    };
    let ab_len2 = ab.x * ab.x + ab.y * ab.y;
    let t = if ab_len2 == 0.0 {
        0.0
    } else {
        ((ap.x * ab.x + ap.y * ab.y) / ab_len2).clamp(0.0, 1.0)
    };
    let closest = Coord {
        x: a.x + t * ab.x,
        y: a.y + t * ab.y,
    };
    let dx = p.x - closest.x;
    let dy = p.y - closest.y;
    (dx * dx + dy * dy).sqrt()
}

/// minimum planar distance from a point to a linestring.
pub fn point_to_linestring_distance(p: Coord<f64>, ls: &LineString<f64>) -> f64 {
    ls.lines()
        .map(|l| point_to_segment_distance(p, l.start, l.end))
        .fold(f64::INFINITY, f64::min)
}

/// displace a linestring perpendicular to its direction of travel. positive
/// distances offset to the left, negative to the right. joins are mitered,
/// with the miter length capped to avoid spikes at sharp angles.
pub fn offset_linestring(ls: &LineString<f64>, distance: f64) -> LineString<f64> {
    let coords = &ls.0;
    if coords.len() < 2 || distance == 0.0 {
        return ls.clone();
    }

    // unit left normal per segment, skipping zero-length segments
    let mut normals: Vec<Coord<f64>> = Vec::with_capacity(coords.len() - 1);
    let mut fallback = Coord { x: 0.0, y: 0.0 };
    for line in ls.lines() {
        let d = line.delta();
        let len = (d.x * d.x + d.y * d.y).sqrt();
        let n = if len == 0.0 {
            fallback
        } else {
            Coord {
                x: -d.y / len,
                y: d.x / len,
            }
        };
        fallback = n;
        normals.push(n);
    }

    let miter_limit = 3.0 * distance.abs();
    let offset_coords = coords
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let shift: Coord<f64> = if i == 0 {
                Coord {
                    x: normals[0].x * distance,
                    y: normals[0].y * distance,
                }
            } else if i == coords.len() - 1 {
                let n = normals[normals.len() - 1];
                Coord {
                    x: n.x * distance,
                    y: n.y * distance,
                }
            } else {
                let n1 = normals[i - 1];
                let n2 = normals[i];
                let m = Coord {
                    x: n1.x + n2.x,
                    y: n1.y + n2.y,
                };
                let m_len2 = m.x * m.x + m.y * m.y;
                if m_len2 < 1e-12 {
                    // near-180 degree turn; fall back to the incoming normal
                    Coord {
                        x: n1.x * distance,
                        y: n1.y * distance,
                    }
                } else {
                    let scale = 2.0 * distance / m_len2;
                    let mut shift = Coord {
                        x: m.x * scale,
                        y: m.y * scale,
                    };
                    let shift_len = (shift.x * shift.x + shift.y * shift.y).sqrt();
                    if shift_len > miter_limit {
                        let clamp = miter_limit / shift_len;
                        shift = Coord {
                            x: shift.x * clamp,
                            y: shift.y * clamp,
                        };
                    }
                    shift
                }
            };
            Coord {
                x: p.x + shift.x,
                y: p.y + shift.y,
            }
        })
        .collect();
    LineString::new(offset_coords)
}
