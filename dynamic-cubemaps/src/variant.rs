use std::ops::{Index, IndexMut};

/// Which copy of the pipeline's resources a stage works on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Always-active cubemap, captured without the sky.
    Primary,

    /// Cubemap used while the scene is in full-reflections mode; captures the
    /// sky as well.
    Reflections,
}

impl Variant {
    pub const ALL: [Self; 2] = [Self::Primary, Self::Reflections];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Primary => "primary",
            Variant::Reflections => "reflections",
        }
    }
}

/// One value per variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PerVariant<T>([T; 2]);

impl<T> PerVariant<T> {
    pub fn new(primary: T, reflections: T) -> Self {
        Self([primary, reflections])
    }

    pub fn from_fn(mut f: impl FnMut(Variant) -> T) -> Self {
        Self::new(f(Variant::Primary), f(Variant::Reflections))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variant, &T)> + '_ {
        Variant::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Variant> for PerVariant<T> {
    type Output = T;

    fn index(&self, variant: Variant) -> &Self::Output {
        &self.0[variant.index()]
    }
}

impl<T> IndexMut<Variant> for PerVariant<T> {
    fn index_mut(&mut self, variant: Variant) -> &mut Self::Output {
        &mut self.0[variant.index()]
    }
}
