/// Value stored in a uniform cell.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Uint(u32),
    /// Packed as `u32` (0 or 1) on the GPU.
    Bool(bool),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

/// Shape of a uniform value; fixed for the lifetime of a cell.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Float,
    Int,
    Uint,
    Bool,
    Vec2,
    Vec3,
    Vec4,
}

impl UniformKind {
    /// WGSL member type in the generated uniform block.
    pub fn wgsl_type(self) -> &'static str {
        match self {
            UniformKind::Float => "f32",
            UniformKind::Int => "i32",
            UniformKind::Uint | UniformKind::Bool => "u32",
            UniformKind::Vec2 => "vec2<f32>",
            UniformKind::Vec3 => "vec3<f32>",
            UniformKind::Vec4 => "vec4<f32>",
        }
    }

    /// Byte size in the uniform address space.
    pub fn size(self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Int | UniformKind::Uint | UniformKind::Bool => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
        }
    }

    /// Byte alignment in the uniform address space.
    pub fn align(self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Int | UniformKind::Uint | UniformKind::Bool => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 | UniformKind::Vec4 => 16,
        }
    }
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Uint(_) => UniformKind::Uint,
            UniformValue::Bool(_) => UniformKind::Bool,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match *self {
            UniformValue::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Writes the GPU representation into `out`, which must be exactly
    /// `kind().size()` bytes.
    pub fn write_bytes(&self, out: &mut [u8]) {
        match self {
            UniformValue::Float(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Int(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Uint(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Bool(v) => out.copy_from_slice(bytemuck::bytes_of(&(*v as u32))),
            UniformValue::Vec2(v) => out.copy_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Vec3(v) => out.copy_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Vec4(v) => out.copy_from_slice(bytemuck::cast_slice(v)),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::Uint(v)
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}
