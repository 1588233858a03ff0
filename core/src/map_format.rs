//! Line-oriented map text format.
//!
//! One city per line:
//!   `<City> <direction>=<City> [<direction>=<City> ...]`
//! Directions are case-insensitive. Borders are linked both ways, so a
//! map only needs to list each border once. A line naming a direction
//! another line already used overrides it, and the displaced border is
//! dropped on both sides. Blank lines are malformed.

use crate::{
    city_map::CityMap,
    direction::Direction,
    error::{SimError, SimResult},
};
use std::io::{BufRead, Write};

/// Parse a whole map. Any malformed line aborts the parse; no partial
/// map is ever returned.
pub fn parse<R: BufRead>(reader: R) -> SimResult<CityMap> {
    let mut map = CityMap::new();
    for (i, line) in reader.lines().enumerate() {
        parse_line(&mut map, i + 1, &line?)?;
    }
    Ok(map)
}

pub fn parse_str(text: &str) -> SimResult<CityMap> {
    parse(text.as_bytes())
}

fn parse_line(map: &mut CityMap, line_no: usize, line: &str) -> SimResult<()> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 || tokens[0].contains('=') {
        return Err(SimError::MalformedLine { line_no, line: line.to_string() });
    }

    let city_name = tokens[0];
    let city = map.get_or_create(city_name);

    for border in &tokens[1..] {
        let parts: Vec<&str> = border.split('=').collect();
        let (dir_token, neighbor_name) = match parts.as_slice() {
            [dir, name] if !dir.is_empty() && !name.is_empty() => (*dir, *name),
            _ => {
                return Err(SimError::MalformedBorder {
                    line_no,
                    border: border.to_string(),
                    line: line.to_string(),
                })
            }
        };

        let dir = Direction::parse(dir_token).map_err(|_| SimError::UnknownDirection {
            line_no,
            direction: dir_token.to_string(),
            city: neighbor_name.to_string(),
        })?;

        if neighbor_name == city_name {
            return Err(SimError::SelfBorder { line_no, city: city_name.to_string() });
        }

        let neighbor = map.get_or_create(neighbor_name);
        map.link(city, dir, neighbor);
    }
    Ok(())
}

/// Write one line per city, in insertion order, borders in natural
/// direction order. A city whose borders were all destroyed is written
/// as its bare name.
pub fn print<W: Write>(writer: &mut W, map: &CityMap) -> std::io::Result<()> {
    for (_, city) in map.iter() {
        write!(writer, "{}", city.name)?;
        for (dir, neighbor) in city.borders() {
            write!(writer, " {}={}", dir, map.name(neighbor))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn to_string(map: &CityMap) -> String {
    let mut buf = Vec::new();
    print(&mut buf, map).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}
