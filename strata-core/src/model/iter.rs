use crate::{AttributeDef, Model, Value};

/// Ordered walk over the attributes of a model, yielding external names and
/// stored values in declaration order. Cloning or [`Attributes::rewind`]
/// restarts the walk.
#[derive(Clone)]
pub struct Attributes<'a> {
    model: &'a Model,
    position: usize,
}

impl<'a> Attributes<'a> {
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Descriptor of the attribute that the next call to `next` yields.
    pub fn peek_def(&self) -> Option<&'static AttributeDef> {
        self.model.schema().attributes().get(self.position)
    }
}

impl<'a> Iterator for Attributes<'a> {
    type Item = (&'static str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let attribute = self.peek_def()?;
        self.position += 1;
        Some((attribute.name, self.model.member(attribute)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.model.schema().attributes().len() - self.position;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Attributes<'_> {}

impl Model {
    pub fn iter(&self) -> Attributes<'_> {
        Attributes {
            model: self,
            position: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = (&'static str, &'a Value);
    type IntoIter = Attributes<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
