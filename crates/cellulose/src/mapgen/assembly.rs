//! Composition of room and hallway fields into the global field, and the wall layer.

use crate::error::FieldError;

use super::field::Field;
use super::placement::MapLayout;

pub const WALL_GLYPH: char = '#';
pub const OPEN_GLYPH: char = '.';
pub const VOID_GLYPH: char = ' ';

impl MapLayout {
    /// ORs every room at its tile offset and every hallway at its span offset into
    /// an all-closed field covering the whole grid.
    pub fn assemble(&self) -> Result<Field, FieldError> {
        let tiles_per_cell = self.config.tiles_per_cell;
        let mut field = Field::new(self.config.map_width(), self.config.map_height())?;
        for room in self.rooms() {
            field.stamp(&room.field, room.tile_offset(tiles_per_cell))?;
        }
        for hallway in &self.hallways {
            field.stamp(&hallway.path.field, hallway.path.offset)?;
        }
        Ok(field)
    }
}

/// Closed tiles with at least one open 8-neighbor. Closed tiles buried in rock and
/// every open tile are left out.
pub fn derive_walls(field: &Field) -> Field {
    field.par_map(|pos| !field.is_open(pos) && field.open_neighbors(pos) > 0)
}

/// One line per row: walls as `#`, open tiles as `.`, everything else blank.
pub fn render_ascii(field: &Field, walls: &Field) -> String {
    let mut out = String::with_capacity((field.width() + 1) * field.height());
    for pos in field.positions() {
        if pos.x == 0 && pos.y > 0 {
            out.push('\n');
        }
        let glyph = if walls.is_open(pos) {
            WALL_GLYPH
        } else if field.is_open(pos) {
            OPEN_GLYPH
        } else {
            VOID_GLYPH
        };
        out.push(glyph);
    }
    out.push('\n');
    out
}
