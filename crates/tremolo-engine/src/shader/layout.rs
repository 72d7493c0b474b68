use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::{Uniform, UniformKind};

/// Binding group of the generated uniform block.
pub const UNIFORM_GROUP: u32 = 0;
/// Binding index of the generated uniform block.
pub const UNIFORM_BINDING: u32 = 0;

/// One member of the generated `Uniforms` struct.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformField {
    pub name: String,
    pub kind: UniformKind,
    pub offset: usize,
}

/// Uniform-address-space layout of a bundle's uniforms.
///
/// Members are ordered by name. Offsets follow WGSL alignment rules and the
/// total size is rounded up to 16 bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    size: usize,
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

impl UniformLayout {
    pub fn from_uniforms(uniforms: &BTreeMap<String, Uniform>) -> Self {
        let mut fields = Vec::with_capacity(uniforms.len());
        let mut cursor = 0;

        for (name, uniform) in uniforms {
            let kind = uniform.kind();
            let offset = align_up(cursor, kind.align());
            cursor = offset + kind.size();
            fields.push(UniformField {
                name: name.clone(),
                kind,
                offset,
            });
        }

        Self {
            fields,
            size: align_up(cursor, 16),
        }
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Buffer size in bytes; zero when there are no uniforms.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// WGSL declaration of the block, bound as `u`. Empty for an empty layout.
    pub fn wgsl_block(&self) -> String {
        if self.fields.is_empty() {
            return String::new();
        }

        let mut out = String::from("struct Uniforms {\n");
        for field in &self.fields {
            let _ = writeln!(out, "    {}: {},", field.name, field.kind.wgsl_type());
        }
        out.push_str("};\n\n");
        let _ = writeln!(
            out,
            "@group({UNIFORM_GROUP}) @binding({UNIFORM_BINDING}) var<uniform> u: Uniforms;"
        );
        out
    }

    /// Packs the current values of `uniforms` into `out` (resized to `size`).
    pub fn write(&self, uniforms: &BTreeMap<String, Uniform>, out: &mut Vec<u8>) {
        out.clear();
        out.resize(self.size, 0);

        for field in &self.fields {
            let Some(uniform) = uniforms.get(&field.name) else {
                continue;
            };
            let value = uniform.get();
            // Kinds are fixed per cell, so this only guards hand-built maps.
            if value.kind() != field.kind {
                continue;
            }
            let end = field.offset + field.kind.size();
            value.write_bytes(&mut out[field.offset..end]);
        }
    }
}
