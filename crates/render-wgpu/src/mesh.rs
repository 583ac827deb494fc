use bytemuck::{Pod, Zeroable};
use cubefield_common::Color;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Generate unit cube vertices and indices.
pub(crate) fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// Horizontal square of edge `size` centred on the origin, facing +Y.
pub(crate) fn plane_mesh(size: f32) -> (Vec<Vertex>, Vec<u16>) {
    let h = size * 0.5;
    let n = [0.0, 1.0, 0.0];
    let vertices = vec![
        Vertex { position: [-h, 0.0, -h], normal: n },
        Vertex { position: [-h, 0.0, h], normal: n },
        Vertex { position: [h, 0.0, h], normal: n },
        Vertex { position: [h, 0.0, -h], normal: n },
    ];
    (vertices, vec![0, 1, 2, 2, 3, 0])
}

/// Grid helper lines: `divisions + 1` lines along each axis spanning `size`,
/// at height `y`.
pub(crate) fn grid_lines(size: f32, divisions: u32, color: Color, opacity: f32, y: f32) -> Vec<LineVertex> {
    let divisions = divisions.max(1);
    let half = size * 0.5;
    let step = size / divisions as f32;
    let color = color.to_linear_rgba(1.0, opacity);

    let mut verts = Vec::with_capacity((divisions as usize + 1) * 4);
    for i in 0..=divisions {
        let offset = -half + i as f32 * step;
        // Lines along X
        verts.push(LineVertex { position: [-half, y, offset], color });
        verts.push(LineVertex { position: [half, y, offset], color });
        // Lines along Z
        verts.push(LineVertex { position: [offset, y, -half], color });
        verts.push(LineVertex { position: [offset, y, half], color });
    }
    verts
}

/// Axes helper: X red, Y green, Z blue, each `size` long from the origin.
pub(crate) fn axes_lines(size: f32) -> Vec<LineVertex> {
    let axes = [
        ([size, 0.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
        ([0.0, size, 0.0], [0.0, 1.0, 0.0, 1.0]),
        ([0.0, 0.0, size], [0.0, 0.0, 1.0, 1.0]),
    ];
    axes.iter()
        .flat_map(|&(end, color)| {
            [
                LineVertex { position: [0.0; 3], color },
                LineVertex { position: end, color },
            ]
        })
        .collect()
}
