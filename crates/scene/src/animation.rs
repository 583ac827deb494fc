use crate::config::AnimationParams;
use crate::scene::Scene;

/// Vertical offset of the cube with `phase_index` at `elapsed` seconds.
///
/// Two overlaid sine waves: a per-cube wave whose frequency grows with the
/// phase index, plus a slow bob shared by every cube.
pub fn height_offset(params: &AnimationParams, phase_index: u32, elapsed: f32) -> f32 {
    let angle = elapsed * params.phase_rate;
    let wave = (angle * phase_index as f32).sin() * params.wave_amplitude;
    let bob = (elapsed * params.bob_rate).sin() * params.bob_amplitude;
    wave + bob
}

/// Move every cube to `base_height + height_offset` for this frame.
///
/// The phase comes from the cube's stored phase index, not its position in
/// the scene graph.
pub fn animate(scene: &mut Scene, params: &AnimationParams, elapsed: f32) {
    for cube in scene.cubes_mut() {
        cube.transform.position.y =
            cube.base_height + height_offset(params, cube.phase_index, elapsed);
    }
    scene.set_elapsed(elapsed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SceneBuilder;
    use std::f32::consts::{FRAC_PI_2, TAU};

    const EPS: f32 = 1e-3;

    fn wave_only() -> AnimationParams {
        AnimationParams {
            bob_amplitude: 0.0,
            ..AnimationParams::default()
        }
    }

    fn bob_only() -> AnimationParams {
        AnimationParams {
            wave_amplitude: 0.0,
            ..AnimationParams::default()
        }
    }

    #[test]
    fn offset_is_zero_at_start() {
        let params = AnimationParams::default();
        for i in 0..100 {
            assert_eq!(height_offset(&params, i, 0.0), 0.0);
        }
    }

    #[test]
    fn wave_term_is_periodic() {
        let params = wave_only();
        for i in [1_u32, 3, 17, 99] {
            let period = TAU / (params.phase_rate * i as f32);
            for t in [0.3_f32, 1.7, 4.2] {
                let a = height_offset(&params, i, t);
                let b = height_offset(&params, i, t + period);
                assert!((a - b).abs() < EPS, "i={i} t={t}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn wave_term_for_index_one_has_base_period() {
        let params = wave_only();
        let period = TAU / 0.05;
        let a = height_offset(&params, 1, 2.0);
        let b = height_offset(&params, 1, 2.0 + period);
        assert!((a - b).abs() < EPS);
    }

    #[test]
    fn bob_term_is_periodic() {
        let params = bob_only();
        let period = TAU / params.bob_rate;
        for i in [0_u32, 50, 99] {
            let a = height_offset(&params, i, 1.25);
            let b = height_offset(&params, i, 1.25 + period);
            assert!((a - b).abs() < EPS);
        }
    }

    #[test]
    fn index_zero_has_no_wave() {
        let params = wave_only();
        assert_eq!(height_offset(&params, 0, 12.5), 0.0);
    }

    #[test]
    fn start_frame_keeps_base_heights() {
        let params = AnimationParams::default();
        let mut scene = SceneBuilder::default().build_seeded(1);
        animate(&mut scene, &params, 0.0);
        for cube in scene.cubes() {
            assert_eq!(cube.transform.position.y, cube.base_height);
        }
    }

    #[test]
    fn bob_peak_lifts_every_cube_by_one() {
        let params = bob_only();
        let t = FRAC_PI_2 / params.bob_rate;
        let mut scene = SceneBuilder::default().build_seeded(2);
        animate(&mut scene, &params, t);
        for cube in scene.cubes() {
            let lift = cube.transform.position.y - cube.base_height;
            assert!((lift - 1.0).abs() < 1e-5, "lift {lift}");
        }
        assert_eq!(scene.elapsed(), t);
    }

    #[test]
    fn full_formula_matches_reference() {
        let params = AnimationParams::default();
        let t = 3.0_f32;
        let i = 7_u32;
        let expected = (t * 0.05 * i as f32).sin() * 0.4 + (t * 0.32).sin();
        assert!((height_offset(&params, i, t) - expected).abs() < 1e-6);
    }

    #[test]
    fn horizontal_positions_do_not_move() {
        let params = AnimationParams::default();
        let mut scene = SceneBuilder::default().build_seeded(4);
        let before: Vec<_> = scene
            .cubes()
            .map(|c| (c.transform.position.x, c.transform.position.z))
            .collect();
        animate(&mut scene, &params, 8.0);
        let after: Vec<_> = scene
            .cubes()
            .map(|c| (c.transform.position.x, c.transform.position.z))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn reordering_nodes_keeps_each_cubes_motion() {
        let params = AnimationParams::default();
        let builder = SceneBuilder::default();
        let mut ordered = builder.build_seeded(8);
        let mut reversed = builder.build_seeded(8);
        reversed.reverse_nodes();

        animate(&mut ordered, &params, 5.5);
        animate(&mut reversed, &params, 5.5);

        for cube in ordered.cubes() {
            let twin = reversed
                .cubes()
                .find(|c| c.cell == cube.cell)
                .unwrap();
            assert_eq!(twin.transform.position.y, cube.transform.position.y);
        }
    }
}
