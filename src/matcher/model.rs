use crate::model::Nargs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Bound {
    Range(u8, u8),
    Lower(u8),
}

impl From<Nargs> for Bound {
    fn from(value: Nargs) -> Self {
        match value {
            Nargs::Precisely(n) => Bound::Range(n, n),
            Nargs::Any => Bound::Lower(0),
            Nargs::AtLeastOne => Bound::Lower(1),
        }
    }
}

impl Bound {
    pub(crate) fn lower(&self) -> u8 {
        match self {
            Bound::Range(lower, _) => *lower,
            Bound::Lower(lower) => *lower,
        }
    }

    pub(crate) fn upper(&self) -> Option<u8> {
        match self {
            Bound::Range(_, upper) => Some(*upper),
            Bound::Lower(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{distributions::Standard, prelude::Distribution, thread_rng, Rng};
    use rstest::rstest;

    impl Distribution<Bound> for Standard {
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Bound {
            match rng.gen_range(0..2) {
                0 => {
                    let upper: u8 = rng.gen();

                    if upper == 0 {
                        Bound::Range(0, upper)
                    } else {
                        Bound::Range(rng.gen_range(0..upper), upper)
                    }
                }
                1 => Bound::Lower(rng.gen()),
                _ => unreachable!("internal error - impossible gen_range()"),
            }
        }
    }

    #[test]
    fn random_bounds_consistent() {
        for _ in 0..100 {
            let bound: Bound = thread_rng().gen();

            if let Some(upper) = bound.upper() {
                assert!(bound.lower() <= upper);
            }
        }
    }

    #[test]
    fn from_nargs() {
        assert_eq!(Bound::from(Nargs::Precisely(0)), Bound::Range(0, 0));
        assert_eq!(Bound::from(Nargs::Precisely(1)), Bound::Range(1, 1));
        assert_eq!(Bound::from(Nargs::Any), Bound::Lower(0));
        assert_eq!(Bound::from(Nargs::AtLeastOne), Bound::Lower(1));
    }

    #[rstest]
    #[case(Bound::Range(0, 0), 0, Some(0))]
    #[case(Bound::Range(1, 1), 1, Some(1))]
    #[case(Bound::Range(1, 3), 1, Some(3))]
    #[case(Bound::Lower(0), 0, None)]
    #[case(Bound::Lower(2), 2, None)]
    fn limits(#[case] bound: Bound, #[case] lower: u8, #[case] upper: Option<u8>) {
        assert_eq!(bound.lower(), lower);
        assert_eq!(bound.upper(), upper);
    }
}
