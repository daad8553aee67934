use super::Vec3;

/// Row-major 4x4 matrix over `f64`, row-vector convention (`v' = v * M`).
///
/// Every operation post-multiplies (`m = m * op`). Under this convention a
/// `translate` applied to an already-composed matrix adds its components
/// directly onto the translation row, i.e. it is a world-space translation
/// regardless of any prior rotation or scale. Per-frame camera-relative
/// repositioning depends on exactly that property.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub m: [f64; 16],
}

impl Mat4 {
    pub fn identity() -> Self {
        Self {
            m: [
                1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    pub fn translate(&mut self, v: Vec3) -> &mut Self {
        let t = Self {
            m: [
                1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                v.x, v.y, v.z, 1.0,
            ],
        };
        self.m = mul(&self.m, &t.m);
        self
    }

    pub fn scale_uniform(&mut self, k: f64) -> &mut Self {
        let s = Self {
            m: [
                k, 0.0, 0.0, 0.0, //
                0.0, k, 0.0, 0.0, //
                0.0, 0.0, k, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        };
        self.m = mul(&self.m, &s.m);
        self
    }

    /// Rotation about Z, counter-clockwise for positive angles.
    pub fn rotate_z(&mut self, rad: f64) -> &mut Self {
        let (sin, cos) = rad.sin_cos();
        let r = Self {
            m: [
                cos, sin, 0.0, 0.0, //
                -sin, cos, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        };
        self.m = mul(&self.m, &r.m);
        self
    }

    /// The translation row of the matrix.
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.m[12], self.m[13], self.m[14])
    }

    /// Applies the matrix to a point (row-vector convention, w = 1).
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            p.x * m[0] + p.y * m[4] + p.z * m[8] + m[12],
            p.x * m[1] + p.y * m[5] + p.z * m[9] + m[13],
            p.x * m[2] + p.y * m[6] + p.z * m[10] + m[14],
        )
    }
}

fn mul(a: &[f64; 16], b: &[f64; 16]) -> [f64; 16] {
    let mut out = [0.0; 16];
    for row in 0..4 {
        for col in 0..4 {
            let mut acc = 0.0;
            for k in 0..4 {
                acc += a[row * 4 + k] * b[k * 4 + col];
            }
            out[row * 4 + col] = acc;
        }
    }
    out
}
