//! Centralized color palette: one source of truth for fixture, paddle and UI colors.

use bevy::prelude::*;
use tt_core::{Fixture, Side};

pub struct Palette;
impl Palette {
    pub const WALL: Color = Color::srgb_u8(0xe0, 0xe0, 0xe0);
    pub const FLOOR: Color = Color::srgb_u8(0xd0, 0xd0, 0xd0);
    pub const CEILING: Color = Palette::WALL;
    pub const TABLE: Color = Color::BLACK;
    /// Table outline, drawn with gizmos.
    pub const TABLE_EDGE: Color = Color::srgb_u8(0x94, 0x00, 0xd3);
    pub const NET: Color = Color::srgba(1.0, 1.0, 1.0, 0.7);
    pub const NET_GRID: Color = Color::WHITE;
    pub const SCOREBOARD: Color = Color::srgb_u8(0x22, 0x22, 0x22);
    pub const BANNER: Color = Color::srgb_u8(0xff, 0xd7, 0x00);
    pub const BALL: Color = Color::WHITE;
    pub const PADDLE_NEAR: Color = Color::srgb_u8(0xff, 0x00, 0x00);
    pub const PADDLE_FAR: Color = Color::srgb_u8(0x00, 0x00, 0xff);
    pub const SCORE_TEXT: Color = Color::srgb(0.1, 0.1, 0.12);
}

#[inline]
pub fn color_for_fixture(fixture: Fixture) -> Color {
    match fixture {
        Fixture::Wall => Palette::WALL,
        Fixture::Ceiling => Palette::CEILING,
        Fixture::Floor => Palette::FLOOR,
        Fixture::Table => Palette::TABLE,
        Fixture::Net => Palette::NET,
        Fixture::Scoreboard => Palette::SCOREBOARD,
        Fixture::Banner => Palette::BANNER,
    }
}

#[inline]
pub fn paddle_color(side: Side) -> Color {
    match side {
        Side::Near => Palette::PADDLE_NEAR,
        Side::Far => Palette::PADDLE_FAR,
    }
}
