/// Painter's-algorithm renderer for the twisted shaft surface
use tracing::{debug, warn};

use crate::color::{Rgba, StressColorMap};
use crate::error::VisualizerError;
use crate::mesh::SurfaceMesh;
use crate::projection::{Camera, ProjectedPoint, Viewport};
use crate::surface::{Paint, Surface};

/// Translucent fill shared by every quad
pub const BASE_FILL: Rgba = Rgba::new(33, 150, 243, 0.1);

/// Longitudinal reference lines drawn over the surface
pub const REFERENCE_LINES: usize = 16;

/// One surface patch in screen space, alive for a single pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub corners: [ProjectedPoint; 4],
    /// Mean view depth of the four corners
    pub center_depth: f64,
    /// Mean twist rotation of the four corners
    pub rotation: f64,
    /// |rotation| over the largest |rotation| in the mesh
    pub normalized_twist: f64,
}

/// What one mesh pass drew
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshStats {
    pub quads_drawn: usize,
    /// Quads with a corner that could not be projected
    pub quads_skipped: usize,
    pub rows_skipped: usize,
    pub points_skipped: usize,
    /// Center depth of each quad in draw order
    pub depths: Vec<f64>,
}

/// Projects, sorts and draws surface meshes
#[derive(Debug, Clone, Default)]
pub struct MeshRenderer {
    colors: StressColorMap,
}

impl MeshRenderer {
    pub fn new(colors: StressColorMap) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &StressColorMap {
        &self.colors
    }

    /// Build the quads of `mesh`, farthest first.
    ///
    /// Ragged or empty rows are skipped, as are quads with a corner behind
    /// the eye; both counts are added to `stats`.
    pub fn build_quads(
        &self,
        mesh: &SurfaceMesh,
        camera: &Camera,
        viewport: &Viewport,
        stats: &mut MeshStats,
    ) -> Vec<Quad> {
        let max_rotation = mesh.max_rotation();
        let projected: Vec<Vec<Option<ProjectedPoint>>> = mesh
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|p| camera.try_project(&p.position, viewport).ok())
                    .collect()
            })
            .collect();

        let mut quads = Vec::new();
        for (i, pair) in mesh.rows().windows(2).enumerate() {
            let (near, far) = (&pair[0], &pair[1]);
            if near.len() != far.len() || near.len() < 2 {
                let err = VisualizerError::MissingMeshData {
                    row: i,
                    expected: near.len().max(far.len()).max(2),
                    found: near.len().min(far.len()),
                };
                warn!(%err, "skipping mesh row");
                stats.rows_skipped += 1;
                continue;
            }

            for j in 0..near.len() - 1 {
                let (Some(a), Some(b), Some(c), Some(d)) = (
                    projected[i][j],
                    projected[i][j + 1],
                    projected[i + 1][j + 1],
                    projected[i + 1][j],
                ) else {
                    stats.quads_skipped += 1;
                    continue;
                };
                let corners = [a, b, c, d];
                let rotation =
                    (near[j].rotation + near[j + 1].rotation + far[j + 1].rotation + far[j].rotation)
                        / 4.0;
                let normalized_twist = if max_rotation > 0.0 {
                    rotation.abs() / max_rotation
                } else {
                    0.0
                };

                quads.push(Quad {
                    corners,
                    center_depth: corners.iter().map(|c| c.depth).sum::<f64>() / 4.0,
                    rotation,
                    normalized_twist,
                });
            }
        }

        if stats.quads_skipped > 0 {
            warn!(
                skipped = stats.quads_skipped,
                zoom = camera.zoom(),
                "quads with corners behind the eye were not drawn"
            );
        }

        // Stable, farthest first
        quads.sort_by(|a, b| b.center_depth.total_cmp(&a.center_depth));
        quads
    }

    /// Fill and stroke every quad of `mesh` back to front
    pub fn render_mesh<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        mesh: &SurfaceMesh,
        camera: &Camera,
        viewport: &Viewport,
    ) -> MeshStats {
        let mut stats = MeshStats::default();
        let quads = self.build_quads(mesh, camera, viewport, &mut stats);

        for quad in &quads {
            let outline = quad.corners.map(|c| (c.x, c.y));
            surface.trace_path(&outline);
            surface.close_path();
            surface.fill(&Paint::Solid(BASE_FILL));
            surface.stroke(self.colors.color_for(quad.normalized_twist).into(), 1.0);

            stats.depths.push(quad.center_depth);
        }
        stats.quads_drawn = quads.len();

        debug!(
            quads = stats.quads_drawn,
            quads_skipped = stats.quads_skipped,
            rows_skipped = stats.rows_skipped,
            "mesh pass complete"
        );
        stats
    }

    /// Draw longitudinal lines at evenly spaced columns, each segment colored
    /// by the twist of the ring it reaches.
    ///
    /// Returns the number of points that were missing or could not be
    /// projected. Segments touching such a point are not drawn.
    pub fn render_reference_lines<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        mesh: &SurfaceMesh,
        camera: &Camera,
        viewport: &Viewport,
    ) -> usize {
        let rows = mesh.rows();
        let Some(first) = rows.first().filter(|row| !row.is_empty()) else {
            let err = VisualizerError::MissingMeshData {
                row: 0,
                expected: 1,
                found: 0,
            };
            warn!(%err, "no reference lines drawn");
            return 0;
        };

        let columns = first.len();
        let mut skipped = 0;
        for k in 0..REFERENCE_LINES {
            let column = k * columns / REFERENCE_LINES;
            let column_max = rows
                .iter()
                .filter_map(|row| row.get(column))
                .map(|p| p.rotation.abs())
                .fold(0.0, f64::max);

            let mut previous = camera.try_project(&first[column].position, viewport).ok();
            if previous.is_none() {
                skipped += 1;
            }
            for (i, row) in rows.iter().enumerate().skip(1) {
                let Some(point) = row.get(column) else {
                    let err = VisualizerError::MissingMeshData {
                        row: i,
                        expected: column + 1,
                        found: row.len(),
                    };
                    warn!(%err, column, "reference line skips a point");
                    skipped += 1;
                    continue;
                };

                let current = match camera.try_project(&point.position, viewport) {
                    Ok(current) => current,
                    Err(err) => {
                        debug!(%err, column, row = i, "reference line point not projectable");
                        skipped += 1;
                        previous = None;
                        continue;
                    }
                };
                let normalized = if column_max > 0.0 {
                    point.rotation.abs() / column_max
                } else {
                    0.0
                };
                if let Some(previous) = previous {
                    surface.trace_path(&[(previous.x, previous.y), (current.x, current.y)]);
                    surface.stroke(self.colors.color_for(normalized).into(), 1.0);
                }
                previous = Some(current);
            }
        }
        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{generate_twisted_surface, SurfacePoint, ANGULAR_RESOLUTION};
    use crate::params::ShaftParams;
    use crate::projection::MAX_ZOOM;
    use crate::surface::{DrawCommand, RecordingSurface};
    use nalgebra::Point3;

    fn setup() -> (Camera, Viewport) {
        (Camera::default(), Viewport::new(800.0, 600.0, 200.0))
    }

    #[test]
    fn test_quad_count() {
        let (camera, viewport) = setup();
        let params = ShaftParams {
            segments: 3,
            ..Default::default()
        };
        let mesh = generate_twisted_surface(&params, 0.5).unwrap();
        let mut stats = MeshStats::default();
        let quads = MeshRenderer::default().build_quads(&mesh, &camera, &viewport, &mut stats);
        assert_eq!(quads.len(), 3 * ANGULAR_RESOLUTION);
        assert_eq!(stats.rows_skipped, 0);
    }

    #[test]
    fn test_quads_sorted_far_to_near() {
        let (camera, viewport) = setup();
        let mesh = generate_twisted_surface(&ShaftParams::default(), 1.0).unwrap();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let stats = MeshRenderer::default().render_mesh(&mut surface, &mesh, &camera, &viewport);
        assert_eq!(stats.quads_drawn, 10 * ANGULAR_RESOLUTION);
        assert!(stats.depths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_each_quad_filled_and_stroked() {
        let (camera, viewport) = setup();
        let params = ShaftParams {
            segments: 1,
            ..Default::default()
        };
        let mesh = generate_twisted_surface(&params, 0.5).unwrap();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        MeshRenderer::default().render_mesh(&mut surface, &mesh, &camera, &viewport);

        let fills = surface.count(|c| matches!(c, DrawCommand::Fill(Paint::Solid(p)) if *p == BASE_FILL));
        let strokes = surface.count(|c| matches!(c, DrawCommand::Stroke { .. }));
        assert_eq!(fills, ANGULAR_RESOLUTION);
        assert_eq!(strokes, ANGULAR_RESOLUTION);
    }

    #[test]
    fn test_equal_depths_keep_build_order() {
        let camera = Camera::new(0.0, 0.0, 0.0, 1000.0, 1.0);
        let viewport = Viewport::new(800.0, 600.0, 200.0);
        let params = ShaftParams::default();
        let mesh = generate_twisted_surface(&params, 0.0).unwrap();
        let mut stats = MeshStats::default();
        let quads = MeshRenderer::default().build_quads(&mesh, &camera, &viewport, &mut stats);
        assert_eq!(quads.len(), params.segments * ANGULAR_RESOLUTION);

        // Seen head-on every quad in a band shares one depth; farthest band first
        for (band, chunk) in quads.chunks(ANGULAR_RESOLUTION).enumerate() {
            let ring = params.segments - 1 - band;
            assert!(chunk.iter().all(|q| q.center_depth == chunk[0].center_depth));
            for (j, quad) in chunk.iter().enumerate() {
                let first = mesh.get(ring, j).unwrap();
                assert_eq!(
                    quad.corners[0],
                    camera.try_project(&first.position, &viewport).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_quads_behind_the_eye_are_skipped() {
        let mut camera = Camera::default();
        camera.set_zoom(MAX_ZOOM);
        let params = ShaftParams::default();
        let viewport = Viewport::fit_shaft(1920.0, 1080.0, params.length, params.outer_diameter);
        let mesh = generate_twisted_surface(&params, 0.5).unwrap();
        let mut stats = MeshStats::default();
        let quads = MeshRenderer::default().build_quads(&mesh, &camera, &viewport, &mut stats);

        assert!(stats.quads_skipped > 0);
        assert_eq!(quads.len() + stats.quads_skipped, params.segments * ANGULAR_RESOLUTION);
        assert!(quads
            .iter()
            .flat_map(|q| q.corners)
            .all(|c| c != ProjectedPoint::DEGENERATE));
    }

    #[test]
    fn test_untwisted_mesh_uses_min_color() {
        let (camera, viewport) = setup();
        let mesh = generate_twisted_surface(&ShaftParams::default(), 0.0).unwrap();
        let mut stats = MeshStats::default();
        let quads = MeshRenderer::default().build_quads(&mesh, &camera, &viewport, &mut stats);
        assert!(quads.iter().all(|q| q.normalized_twist == 0.0));
    }

    #[test]
    fn test_ragged_row_is_skipped() {
        let (camera, viewport) = setup();
        let mesh = generate_twisted_surface(&ShaftParams::default(), 0.4).unwrap();
        let mut rows = mesh.rows().to_vec();
        rows[4].truncate(10);
        let ragged = SurfaceMesh::from_rows(rows);

        let mut surface = RecordingSurface::new(800.0, 600.0);
        let stats = MeshRenderer::default().render_mesh(&mut surface, &ragged, &camera, &viewport);
        // rows 3-4 and 4-5 both touch the short row
        assert_eq!(stats.rows_skipped, 2);
        assert_eq!(stats.quads_drawn, 8 * ANGULAR_RESOLUTION);
    }

    #[test]
    fn test_reference_lines_skip_missing_points() {
        let (camera, viewport) = setup();
        let point = SurfacePoint {
            position: Point3::new(0.05, 0.0, 0.0),
            angle: 0.0,
            rotation: 0.1,
        };
        let mesh = SurfaceMesh::from_rows(vec![vec![point; 16], vec![point; 16], vec![]]);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let skipped =
            MeshRenderer::default().render_reference_lines(&mut surface, &mesh, &camera, &viewport);
        assert_eq!(skipped, REFERENCE_LINES);
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::Stroke { .. })), REFERENCE_LINES);
    }

    #[test]
    fn test_empty_mesh_draws_nothing() {
        let (camera, viewport) = setup();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let renderer = MeshRenderer::default();
        let stats = renderer.render_mesh(&mut surface, &SurfaceMesh::default(), &camera, &viewport);
        assert_eq!(stats.quads_drawn, 0);
        assert_eq!(
            renderer.render_reference_lines(&mut surface, &SurfaceMesh::default(), &camera, &viewport),
            0
        );
        assert!(surface.commands().is_empty());
    }
}
