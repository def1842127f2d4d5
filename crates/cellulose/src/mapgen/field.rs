//! Passability field: the fixed-size boolean tile buffer every generator carves into.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::types::{Direction, Pos};

const OPEN_GLYPH: char = '.';
const CLOSED_GLYPH: char = '#';

/// Row-major grid of `open` (passable) / `closed` tiles. Dimensions never change after construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "FieldRows", try_from = "FieldRows")]
pub struct Field {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    open: usize,
}

impl Field {
    /// All-closed field.
    pub fn new(width: usize, height: usize) -> Result<Self, FieldError> {
        if width == 0 || height == 0 {
            return Err(FieldError::ZeroSized { width, height });
        }
        Ok(Self { width, height, cells: vec![false; width * height], open: 0 })
    }

    /// Parses rows of `.` (open) and `#` (closed).
    pub fn from_ascii(rows: &[&str]) -> Result<Self, FieldError> {
        let height = rows.len();
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        let mut field = Field::new(width, height)?;
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(FieldError::RaggedRows { row: y, expected: width, found });
            }
            for (x, glyph) in row.chars().enumerate() {
                let open = match glyph {
                    OPEN_GLYPH => true,
                    CLOSED_GLYPH => false,
                    glyph => return Err(FieldError::UnknownGlyph { glyph }),
                };
                if open {
                    field.open_cell(Pos { y: y as i32, x: x as i32 });
                }
            }
        }
        Ok(field)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }

    pub fn get(&self, pos: Pos) -> Option<bool> {
        self.in_bounds(pos).then(|| self.cells[self.index(pos)])
    }

    /// Out-of-bounds tiles read as closed.
    pub fn is_open(&self, pos: Pos) -> bool {
        self.get(pos).unwrap_or(false)
    }

    pub fn set(&mut self, pos: Pos, open: bool) -> Result<(), FieldError> {
        if !self.in_bounds(pos) {
            return Err(FieldError::OutOfBounds { pos, width: self.width, height: self.height });
        }
        let index = self.index(pos);
        match (self.cells[index], open) {
            (false, true) => self.open += 1,
            (true, false) => self.open -= 1,
            _ => {}
        }
        self.cells[index] = open;
        Ok(())
    }

    /// Opens `pos` if it is inside the field. Returns whether the tile changed.
    pub fn open_cell(&mut self, pos: Pos) -> bool {
        if !self.in_bounds(pos) {
            return false;
        }
        let index = self.index(pos);
        if self.cells[index] {
            return false;
        }
        self.cells[index] = true;
        self.open += 1;
        true
    }

    pub fn open_count(&self) -> usize {
        self.open
    }

    /// Fraction of open tiles.
    pub fn openness(&self) -> f64 {
        self.open as f64 / self.cells.len() as f64
    }

    pub fn center(&self) -> Pos {
        Pos { y: (self.height / 2) as i32, x: (self.width / 2) as i32 }
    }

    /// Whether all eight neighbors of `pos` lie inside the field.
    pub fn has_full_neighborhood(&self, pos: Pos) -> bool {
        pos.x > 0
            && pos.y > 0
            && (pos.x as usize) < self.width - 1
            && (pos.y as usize) < self.height - 1
    }

    /// Open tiles among the in-bounds 8-neighbors of `pos`.
    pub fn open_neighbors(&self, pos: Pos) -> u8 {
        Direction::ALL.iter().filter(|&&direction| self.is_open(pos.step(direction))).count() as u8
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }

    pub fn open_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(|&pos| self.cells[self.index(pos)])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.width)
    }

    /// Builds a same-sized field where each tile is `rule(pos)`, evaluated in parallel by row.
    /// `rule` only ever sees the immutable `self`, so rows can be computed in any order.
    pub fn par_map<F>(&self, rule: F) -> Field
    where
        F: Fn(Pos) -> bool + Sync,
    {
        let width = self.width;
        let mut cells = vec![false; self.cells.len()];
        cells.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = rule(Pos { y: y as i32, x: x as i32 });
            }
        });
        let open = cells.iter().filter(|&&cell| cell).count();
        Field { width, height: self.height, cells, open }
    }

    /// ORs every open tile of `src` into `self` at `offset`. Never closes a tile.
    pub fn stamp(&mut self, src: &Field, offset: Pos) -> Result<(), FieldError> {
        let fits = offset.x >= 0
            && offset.y >= 0
            && offset.x as usize + src.width <= self.width
            && offset.y as usize + src.height <= self.height;
        if !fits {
            return Err(FieldError::StampOverhang {
                offset,
                src_width: src.width,
                src_height: src.height,
                width: self.width,
                height: self.height,
            });
        }
        for pos in src.open_positions() {
            self.open_cell(pos.offset(offset.x, offset.y));
        }
        Ok(())
    }

    pub fn to_ascii_rows(&self, open: char, closed: char) -> Vec<String> {
        self.rows()
            .map(|row| row.iter().map(|&cell| if cell { open } else { closed }).collect())
            .collect()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.cells.len());
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        bytes.extend(self.cells.iter().map(|&cell| u8::from(cell)));
        bytes
    }
}

#[derive(Serialize, Deserialize)]
struct FieldRows {
    width: usize,
    height: usize,
    rows: Vec<String>,
}

impl From<Field> for FieldRows {
    fn from(field: Field) -> Self {
        let rows = field.to_ascii_rows(OPEN_GLYPH, CLOSED_GLYPH);
        FieldRows { width: field.width, height: field.height, rows }
    }
}

impl TryFrom<FieldRows> for Field {
    type Error = FieldError;

    fn try_from(repr: FieldRows) -> Result<Self, Self::Error> {
        let rows: Vec<&str> = repr.rows.iter().map(String::as_str).collect();
        let field = Field::from_ascii(&rows)?;
        if field.width != repr.width || field.height != repr.height {
            return Err(FieldError::RaggedRows {
                row: 0,
                expected: repr.width,
                found: field.width,
            });
        }
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_field_is_closed_and_rejects_zero_dimensions() {
        let field = Field::new(4, 3).expect("valid dimensions");
        assert_eq!(field.open_count(), 0);
        assert_eq!(field.len(), 12);
        assert_eq!(Field::new(0, 3), Err(FieldError::ZeroSized { width: 0, height: 3 }));
    }

    #[test]
    fn set_tracks_open_count_and_rejects_out_of_bounds() {
        let mut field = Field::new(3, 3).expect("valid dimensions");
        field.set(Pos { y: 1, x: 1 }, true).expect("in bounds");
        field.set(Pos { y: 1, x: 1 }, true).expect("in bounds");
        assert_eq!(field.open_count(), 1);
        field.set(Pos { y: 1, x: 1 }, false).expect("in bounds");
        assert_eq!(field.open_count(), 0);

        let err = field.set(Pos { y: 3, x: 0 }, true).unwrap_err();
        assert!(matches!(err, FieldError::OutOfBounds { .. }));
    }

    #[test]
    fn open_cell_silently_ignores_out_of_bounds() {
        let mut field = Field::new(2, 2).expect("valid dimensions");
        assert!(!field.open_cell(Pos { y: -1, x: 0 }));
        assert!(field.open_cell(Pos { y: 0, x: 0 }));
        assert!(!field.open_cell(Pos { y: 0, x: 0 }));
        assert_eq!(field.open_count(), 1);
    }

    #[test]
    fn open_neighbors_counts_only_in_bounds_tiles() {
        let field = Field::from_ascii(&["...", "...", "..."]).expect("valid ascii");
        assert_eq!(field.open_neighbors(Pos { y: 1, x: 1 }), 8);
        assert_eq!(field.open_neighbors(Pos { y: 0, x: 0 }), 3);
        assert_eq!(field.open_neighbors(Pos { y: 0, x: 1 }), 5);
    }

    #[test]
    fn stamp_ors_and_refuses_overhang() {
        let mut target = Field::new(5, 5).expect("valid dimensions");
        target.set(Pos { y: 0, x: 0 }, true).expect("in bounds");
        let src = Field::from_ascii(&[".#", "#."]).expect("valid ascii");

        target.stamp(&src, Pos { y: 3, x: 3 }).expect("fits");
        assert!(target.is_open(Pos { y: 0, x: 0 }));
        assert!(target.is_open(Pos { y: 3, x: 3 }));
        assert!(target.is_open(Pos { y: 4, x: 4 }));
        assert!(!target.is_open(Pos { y: 3, x: 4 }));
        assert_eq!(target.open_count(), 3);

        let err = target.stamp(&src, Pos { y: 4, x: 0 }).unwrap_err();
        assert!(matches!(err, FieldError::StampOverhang { .. }));
    }

    #[test]
    fn par_map_matches_sequential_rule() {
        let field = Field::from_ascii(&["#..#", ".##.", "#..#"]).expect("valid ascii");
        let inverted = field.par_map(|pos| !field.is_open(pos));
        for pos in field.positions() {
            assert_eq!(inverted.is_open(pos), !field.is_open(pos));
        }
        assert_eq!(inverted.open_count(), field.len() - field.open_count());
    }

    #[test]
    fn ascii_parsing_rejects_ragged_rows_and_unknown_glyphs() {
        assert!(matches!(
            Field::from_ascii(&["..", "."]),
            Err(FieldError::RaggedRows { row: 1, expected: 2, found: 1 })
        ));
        assert_eq!(Field::from_ascii(&[".x"]), Err(FieldError::UnknownGlyph { glyph: 'x' }));
    }

    #[test]
    fn serde_uses_ascii_rows() {
        let field = Field::from_ascii(&["#.", ".#"]).expect("valid ascii");
        let json = serde_json::to_string(&field).expect("serialize");
        assert!(json.contains("\"#.\""));
        let decoded: Field = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, field);
    }
}
