use std::{collections::HashSet, f64::consts::SQRT_2};

use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Grid moves: four straight steps, then the four diagonals.
const STEPS: [(i64, i64, f64); 8] = [
    (0, -1, 1.0),
    (1, 0, 1.0),
    (0, 1, 1.0),
    (-1, 0, 1.0),
    (-1, -1, SQRT_2),
    (1, -1, SQRT_2),
    (1, 1, SQRT_2),
    (-1, 1, SQRT_2),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// A city on the map with the road distances it claims to its neighbours.
#[derive(Debug, Clone, Deserialize)]
pub struct City {
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub distances: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityMap {
    pub cities: Vec<City>,
}

impl CityMap {
    fn city(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|city| city.name == name)
    }
}

struct Node {
    at: Position,
    g: f64,
    f: f64,
}

fn chebyshev(a: Position, b: Position) -> f64 {
    (a.x - b.x).abs().max((a.y - b.y).abs()) as f64
}

/// Length of the grid path A* finds between two positions, moving in eight
/// directions with diagonal steps costing `√2`.
///
/// Steps that point away from the goal are never taken, and a cell already
/// waiting in the open list is not queued again. `None` means the open list
/// ran dry.
pub fn path_length(from: Position, to: Position) -> Option<f64> {
    let mut open = vec![Node {
        at: from,
        g: 0.0,
        f: chebyshev(from, to),
    }];
    let mut queued = HashSet::from([from]);
    let mut closed = HashSet::new();

    while !open.is_empty() {
        // stable, so equal scores keep their queue order
        open.sort_by(|a, b| a.f.total_cmp(&b.f));
        let current = open.remove(0);
        queued.remove(&current.at);
        if current.at == to {
            return Some(current.g);
        }
        closed.insert(current.at);

        let goal = (to.x - current.at.x, to.y - current.at.y);
        for (dx, dy, cost) in STEPS {
            if goal.0 * dx + goal.1 * dy < 0 {
                continue;
            }
            let at = Position {
                x: current.at.x + dx,
                y: current.at.y + dy,
            };
            if closed.contains(&at) || queued.contains(&at) {
                continue;
            }
            let g = current.g + cost;
            open.push(Node {
                at,
                g,
                f: g + chebyshev(at, to),
            });
            queued.insert(at);
        }
    }
    None
}

/// The pair of cities whose claimed distance exceeds the grid path between
/// them by the most. Pairs that do not exceed it at all are never picked;
/// on a tie the first pair found wins.
pub fn worst_pair(map: &CityMap) -> Option<(&City, &City)> {
    let mut worst_excess = 0.0;
    let mut worst = None;
    for from in &map.cities {
        for (name, distance) in &from.distances {
            let (Some(to), Some(distance)) = (map.city(name), distance.as_f64()) else {
                continue;
            };
            let Some(length) = path_length(from.position, to.position) else {
                continue;
            };
            let excess = distance - length;
            if excess > worst_excess {
                worst_excess = excess;
                worst = Some((from, to));
            }
        }
    }
    worst
}

/// Answer a map question with `[from, to]`, the names of the worst pair.
pub fn solve(map: &Value) -> Option<Value> {
    let map = match CityMap::deserialize(map) {
        Ok(map) => map,
        Err(err) => {
            log::warn!("map question: {:?}", err);
            return None;
        }
    };
    let (from, to) = worst_pair(&map)?;
    log::debug!("worst pair {} -> {}", from.name, to.name);
    Some(json!([from.name, to.name]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: i64, y: i64) -> Position {
        Position { x, y }
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.unwrap();
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn straight_and_diagonal_paths() {
        assert_close(path_length(at(0, 0), at(3, 0)), 3.0);
        assert_close(path_length(at(0, 0), at(2, 2)), 2.0 * SQRT_2);
        assert_close(path_length(at(4, 4), at(4, 4)), 0.0);
    }

    #[test]
    fn mixed_paths_take_diagonals_first() {
        assert_close(path_length(at(0, 0), at(3, 1)), 2.0 + SQRT_2);
        assert_close(path_length(at(5, 5), at(0, 2)), 2.0 + 3.0 * SQRT_2);
        assert_close(path_length(at(1, 1), at(4, 7)), 3.0 + 3.0 * SQRT_2);
    }

    const MAP: &str = r#"{"cities":[
        {"name":"A","position":{"x":0,"y":0},"distances":{"B":5,"C":4}},
        {"name":"B","position":{"x":3,"y":0},"distances":{"A":3,"C":9}},
        {"name":"C","position":{"x":3,"y":1},"distances":{"A":4,"B":1,"Nowhere":50}}
    ]}"#;

    #[test]
    fn picks_the_most_overstated_road() {
        let map: Value = serde_json::from_str(MAP).unwrap();
        assert_eq!(solve(&map), Some(json!(["B", "C"])));
    }

    #[test]
    fn honest_maps_have_no_answer() {
        let map = json!({"cities":[
            {"name":"A","position":{"x":0,"y":0},"distances":{"B":3}},
            {"name":"B","position":{"x":3,"y":0},"distances":{"A":2}}
        ]});
        assert_eq!(solve(&map), None);
    }

    #[test]
    fn malformed_maps_have_no_answer() {
        assert_eq!(solve(&json!({"cities":[]})), None);
        assert_eq!(solve(&json!({"cities":[{"name":"A"}]})), None);
        assert_eq!(solve(&json!("not a map")), None);
    }
}
