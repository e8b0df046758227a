use std::fmt;

/// A reaction: the reactants that collided and the products they turned into.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Reaction<M> {
    pub reactants: Vec<M>,
    pub products: Vec<M>,
}

impl<M> Reaction<M> {
    pub fn new(reactants: Vec<M>, products: Vec<M>) -> Self {
        Self { reactants, products }
    }
}

impl<M: fmt::Display> fmt::Display for Reaction<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn side<M: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[M]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, " + ")?;
                }
                write!(f, "{}", item)?;
            }
            Ok(())
        }
        side(f, &self.reactants)?;
        write!(f, " -> ")?;
        side(f, &self.products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let r = Reaction::new(vec!["A", "B"], vec!["AB"]);
        assert_eq!(r.to_string(), "A + B -> AB");
    }
}
