use glam::Vec3;
use shared::MeshPayload;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 9
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * 9;
        Vec3::new(self.vertices[base], self.vertices[base + 1], self.vertices[base + 2])
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let base = index * 9 + 3;
        Vec3::new(self.vertices[base], self.vertices[base + 1], self.vertices[base + 2])
    }

    /// Triangulate a decoded mesh. Quads split along the 0-2 diagonal;
    /// normals are area-weighted face normals averaged per vertex.
    pub fn from_payload(mesh: &MeshPayload, color: [f32; 3]) -> Self {
        let positions: Vec<Vec3> = mesh
            .vertices
            .iter()
            .map(|v| Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32))
            .collect();

        let mut indices = Vec::with_capacity(mesh.faces.len() * 6);
        for face in &mesh.faces {
            if face.iter().any(|&i| i as usize >= positions.len()) {
                continue;
            }
            match face.as_slice() {
                [a, b, c] => indices.extend_from_slice(&[*a, *b, *c]),
                [a, b, c, d] => indices.extend_from_slice(&[*a, *b, *c, *a, *c, *d]),
                _ => {}
            }
        }

        let mut normals = vec![Vec3::ZERO; positions.len()];
        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
            normals[a] += n;
            normals[b] += n;
            normals[c] += n;
        }

        let mut vertices = Vec::with_capacity(positions.len() * 9);
        for (p, n) in positions.iter().zip(&normals) {
            let n = n.normalize_or_zero();
            vertices.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, color[0], color[1], color[2]]);
        }

        MeshData { vertices, indices }
    }

    /// Unique undirected edges, for wireframe drawing
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<(u32, u32)> = self
            .indices
            .chunks_exact(3)
            .flat_map(|t| [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])])
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Axis-aligned bounds, `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        (0..self.vertex_count())
            .map(|i| self.position(i))
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((min, max)) => Some((min.min(p), max.max(p))),
            })
    }
}
