use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::{ShaderError, UniformKind, UniformValue};

/// Shared, mutable uniform value.
///
/// Clones alias the same cell. The kind is fixed at creation because bundle
/// layouts are derived from it.
#[derive(Clone)]
pub struct Uniform {
    cell: Rc<Cell<UniformValue>>,
    writable: bool,
}

impl Uniform {
    pub fn new(value: impl Into<UniformValue>) -> Self {
        Self {
            cell: Rc::new(Cell::new(value.into())),
            writable: true,
        }
    }

    #[inline]
    pub fn get(&self) -> UniformValue {
        self.cell.get()
    }

    #[inline]
    pub fn kind(&self) -> UniformKind {
        self.cell.get().kind()
    }

    /// Current value as `f32`, if the cell holds a float.
    pub fn float(&self) -> Option<f32> {
        self.cell.get().as_float()
    }

    pub fn set(&self, value: impl Into<UniformValue>) -> Result<(), ShaderError> {
        if !self.writable {
            return Err(ShaderError::ReadOnly);
        }

        let value = value.into();
        let expected = self.kind();
        if value.kind() != expected {
            return Err(ShaderError::KindMismatch {
                expected,
                found: value.kind(),
            });
        }

        self.cell.set(value);
        Ok(())
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// True if both handles alias the same cell.
    #[inline]
    pub fn ptr_eq(&self, other: &Uniform) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for Uniform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uniform")
            .field("value", &self.cell.get())
            .field("writable", &self.writable)
            .finish()
    }
}

/// Sole writer of an animation-time uniform.
///
/// Not `Clone`. Every handle from [`TimeCell::uniform`] is read-only, so the
/// owner of the `TimeCell` is the only code that advances time.
#[derive(Debug)]
pub struct TimeCell {
    cell: Rc<Cell<UniformValue>>,
}

impl TimeCell {
    pub fn new(initial: f32) -> Self {
        Self {
            cell: Rc::new(Cell::new(UniformValue::Float(initial))),
        }
    }

    /// Read-only handle for composing into bundles.
    pub fn uniform(&self) -> Uniform {
        Uniform {
            cell: Rc::clone(&self.cell),
            writable: false,
        }
    }

    #[inline]
    pub fn write(&self, value: f32) {
        self.cell.set(UniformValue::Float(value));
    }

    #[inline]
    pub fn read(&self) -> f32 {
        self.cell.get().as_float().unwrap_or_default()
    }
}

impl Default for TimeCell {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_alias_the_same_cell() {
        let a = Uniform::new(1.0f32);
        let b = a.clone();
        b.set(2.5f32).unwrap();
        assert_eq!(a.get(), UniformValue::Float(2.5));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Uniform::new(2.5f32)));
    }

    #[test]
    fn kind_is_fixed() {
        let u = Uniform::new([0.0f32, 0.0, 0.0]);
        assert_eq!(
            u.set(1.0f32),
            Err(ShaderError::KindMismatch {
                expected: UniformKind::Vec3,
                found: UniformKind::Float
            })
        );
        assert_eq!(u.get(), UniformValue::Vec3([0.0, 0.0, 0.0]));
    }

    #[test]
    fn time_cell_is_the_only_writer() {
        let time = TimeCell::new(0.0);
        let reader = time.uniform();
        let copy = reader.clone();

        assert_eq!(reader.set(1.0f32), Err(ShaderError::ReadOnly));
        assert!(!copy.is_writable());

        time.write(0.75);
        assert_eq!(reader.float(), Some(0.75));
        assert_eq!(copy.float(), Some(0.75));
        assert_eq!(time.read(), 0.75);
    }
}
