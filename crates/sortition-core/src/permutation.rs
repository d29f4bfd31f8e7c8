use thiserror::Error;

#[derive(Debug, Error)]
pub enum PermutationError {
    #[error("Mapping is not a bijection: image {image} appears more than once")]
    NotBijective { image: usize },
    #[error("Mapping image {image} is outside the domain 0..{len}")]
    ImageOutOfRange { image: usize, len: usize },
    #[error("Index {index} is outside the domain 0..{len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Permutation over {got} elements applied to a domain of {expected}")]
    LengthMismatch { expected: usize, got: usize },
}

/// A bijection on `0..n`, used to relabel agents (anonymity) or
/// alternatives (neutrality).
///
/// `forward[i]` is the image of `i`. Validated to be a bijection at
/// construction, so `apply`, `inverse`, and `compose` are total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    forward: Vec<usize>,
}

impl Permutation {
    /// Build a permutation from its image table: `mapping[i]` is where `i`
    /// is sent. Every value in `0..mapping.len()` must appear exactly once.
    pub fn new(mapping: Vec<usize>) -> Result<Self, PermutationError> {
        let len = mapping.len();
        let mut seen = vec![false; len];
        for &image in &mapping {
            if image >= len {
                return Err(PermutationError::ImageOutOfRange { image, len });
            }
            if seen[image] {
                return Err(PermutationError::NotBijective { image });
            }
            seen[image] = true;
        }
        Ok(Self { forward: mapping })
    }

    /// The identity on `0..n`.
    pub fn identity(n: usize) -> Self {
        Self {
            forward: (0..n).collect(),
        }
    }

    /// The transposition on `0..n` swapping `i` and `j`.
    pub fn transposition(n: usize, i: usize, j: usize) -> Result<Self, PermutationError> {
        if i >= n {
            return Err(PermutationError::IndexOutOfRange { index: i, len: n });
        }
        if j >= n {
            return Err(PermutationError::IndexOutOfRange { index: j, len: n });
        }
        let mut forward: Vec<usize> = (0..n).collect();
        forward.swap(i, j);
        Ok(Self { forward })
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// The image of `i`.
    ///
    /// `i` must lie in `0..len()`; ids taken from a matching agenda always
    /// do.
    pub fn apply(&self, i: usize) -> usize {
        self.forward[i]
    }

    /// The inverse bijection.
    pub fn inverse(&self) -> Self {
        let mut backward = vec![0; self.forward.len()];
        for (i, &image) in self.forward.iter().enumerate() {
            backward[image] = i;
        }
        Self { forward: backward }
    }

    /// The composition `self ∘ other`: first `other`, then `self`.
    pub fn compose(&self, other: &Self) -> Result<Self, PermutationError> {
        if self.len() != other.len() {
            return Err(PermutationError::LengthMismatch {
                expected: self.len(),
                got: other.len(),
            });
        }
        Ok(Self {
            forward: other.forward.iter().map(|&i| self.forward[i]).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_bijections() {
        assert!(matches!(
            Permutation::new(vec![0, 0, 1]),
            Err(PermutationError::NotBijective { image: 0 })
        ));
        assert!(matches!(
            Permutation::new(vec![0, 3]),
            Err(PermutationError::ImageOutOfRange { image: 3, len: 2 })
        ));
    }

    #[test]
    fn inverse_undoes_apply() {
        let sigma = Permutation::new(vec![2, 0, 1]).unwrap();
        let inv = sigma.inverse();
        for i in 0..3 {
            assert_eq!(inv.apply(sigma.apply(i)), i);
            assert_eq!(sigma.apply(inv.apply(i)), i);
        }
    }

    #[test]
    fn compose_applies_right_then_left() {
        let sigma = Permutation::new(vec![1, 2, 0]).unwrap();
        let tau = Permutation::transposition(3, 0, 1).unwrap();
        let composed = sigma.compose(&tau).unwrap();
        // tau sends 0 to 1, then sigma sends 1 to 2.
        assert_eq!(composed.apply(0), 2);
        assert_eq!(composed.apply(1), 1);
        assert_eq!(composed.apply(2), 0);
    }

    #[test]
    fn identity_composes_neutrally() {
        let sigma = Permutation::new(vec![1, 0]).unwrap();
        let id = Permutation::identity(2);
        assert_eq!(sigma.compose(&id).unwrap(), sigma);
        assert_eq!(id.compose(&sigma).unwrap(), sigma);
    }
}
