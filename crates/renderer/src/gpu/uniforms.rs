use bytemuck::{Pod, Zeroable};
use field::{FieldParams, Palette};

use crate::runtime::TimeSample;

/// std140 mirror of the `FieldBlock` uniform in the fragment shader.
///
/// Every row is a `vec4`, so no explicit padding fields are needed.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct FieldUniforms {
    /// `(seconds, 0, 0, 0)`; seconds are unscaled.
    pub timing: [f32; 4],
    /// `(x_scale, y_scale, t_scale, gain)`.
    pub scale: [f32; 4],
    /// `(z_offset, z_max, 0, 0)`.
    pub range: [f32; 4],
    /// `(lower_knee, upper_knee, top, 0)`.
    pub knees: [f32; 4],
    pub low: [f32; 4],
    pub mid: [f32; 4],
    pub high: [f32; 4],
}

impl FieldUniforms {
    pub fn new(params: &FieldParams, palette: &Palette) -> Self {
        Self {
            timing: [0.0; 4],
            scale: [params.x_scale, params.y_scale, params.t_scale, params.gain],
            range: [params.z_offset, params.z_max, 0.0, 0.0],
            knees: [palette.lower_knee, palette.upper_knee, palette.top, 0.0],
            low: extend(palette.low),
            mid: extend(palette.mid),
            high: extend(palette.high),
        }
    }

    pub fn update_time(&mut self, sample: TimeSample) {
        self.timing[0] = sample.seconds;
    }
}

fn extend([r, g, b]: [f32; 3]) -> [f32; 4] {
    [r, g, b, 0.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_seven_vec4_rows() {
        assert_eq!(std::mem::size_of::<FieldUniforms>(), 112);
    }

    #[test]
    fn new_packs_params_and_palette() {
        let params = FieldParams::default();
        let palette = Palette::default();
        let uniforms = FieldUniforms::new(&params, &palette);
        assert_eq!(uniforms.scale, [3.0, 3.0, 5.0, 1.5]);
        assert_eq!(uniforms.range, [1.5, 2.0, 0.0, 0.0]);
        assert_eq!(uniforms.knees, [0.64, 0.89, 1.0, 0.0]);
        assert_eq!(uniforms.mid[..3], palette.mid);
        assert_eq!(uniforms.timing, [0.0; 4]);
    }

    #[test]
    fn bytes_follow_field_order() {
        let uniforms = FieldUniforms::new(&FieldParams::default(), &Palette::default());
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&uniforms));
        assert_eq!(floats.len(), 28);
        assert_eq!(floats[0], 0.0);
        assert_eq!(floats[4], 3.0);
        assert_eq!(floats[7], 1.5);
        assert_eq!(floats[8], 1.5);
        assert_eq!(floats[9], 2.0);
    }

    #[test]
    fn time_update_touches_only_the_timing_row() {
        let mut uniforms = FieldUniforms::new(&FieldParams::default(), &Palette::default());
        let before = uniforms;
        uniforms.update_time(TimeSample::new(2.5, 7));
        assert_eq!(uniforms.timing, [2.5, 0.0, 0.0, 0.0]);
        assert_eq!(uniforms.scale, before.scale);
        assert_eq!(uniforms.high, before.high);
    }
}
