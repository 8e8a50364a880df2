// Gizmo overlays: the table edge outline and the net mesh grid.

use bevy::prelude::*;
use tt_config::GameConfig;
use tt_core::GameConfigRes;

use crate::palette::Palette;

/// Spacing of the net grid cells (meters).
pub const NET_CELL: f32 = 0.05;

/// Box transform matching the table slab, for `Gizmos::cuboid`.
pub fn table_outline(cfg: &GameConfig) -> Transform {
    let t = &cfg.table;
    Transform::from_xyz(0.0, t.center_y(), 0.0).with_scale(Vec3::new(t.width, t.thickness, t.length))
}

/// Line segments of the net grid on the z = 0 plane.
pub fn net_grid_lines(cfg: &GameConfig) -> Vec<(Vec3, Vec3)> {
    let half_w = cfg.table.width * 0.5 + cfg.net.overhang;
    let bottom = cfg.table.top_height;
    let top = bottom + cfg.net.height;
    let mut lines = Vec::new();
    let columns = ((half_w * 2.0) / NET_CELL).round().max(1.0) as usize;
    for i in 0..=columns {
        let x = -half_w + i as f32 * (half_w * 2.0 / columns as f32);
        lines.push((Vec3::new(x, bottom, 0.0), Vec3::new(x, top, 0.0)));
    }
    let rows = (cfg.net.height / NET_CELL).round().max(1.0) as usize;
    for j in 0..=rows {
        let y = bottom + j as f32 * (cfg.net.height / rows as f32);
        lines.push((Vec3::new(-half_w, y, 0.0), Vec3::new(half_w, y, 0.0)));
    }
    lines
}

pub(crate) fn draw_outlines(mut gizmos: Gizmos, cfg: Option<Res<GameConfigRes>>) {
    let Some(cfg) = cfg else { return; };
    gizmos.cuboid(table_outline(&cfg.0), Palette::TABLE_EDGE);
    for (a, b) in net_grid_lines(&cfg.0) {
        gizmos.line(a, b, Palette::NET_GRID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_wraps_table_top() {
        let cfg = GameConfig::default();
        let tf = table_outline(&cfg);
        assert!((tf.translation.y + tf.scale.y * 0.5 - cfg.table.top_height).abs() < 1e-5);
        assert_eq!(tf.scale.z, cfg.table.length);
    }

    #[test]
    fn net_grid_spans_net_rectangle() {
        let cfg = GameConfig::default();
        let lines = net_grid_lines(&cfg);
        let half_w = cfg.table.width * 0.5;
        assert!(lines.iter().all(|(a, b)| a.z == 0.0 && b.z == 0.0));
        let max_y = lines.iter().map(|(_, b)| b.y).fold(f32::MIN, f32::max);
        assert!((max_y - (cfg.table.top_height + cfg.net.height)).abs() < 1e-4);
        assert!(lines.iter().any(|(a, _)| (a.x + half_w).abs() < 1e-4));
        assert!(lines.iter().any(|(a, _)| (a.x - half_w).abs() < 1e-4));
    }
}
