pub trait OptionExt<T> {
    /// `Some(f())` when the guard holds, `None` otherwise.
    fn when<F>(cond: bool, f: F) -> Option<T>
    where
        F: FnOnce() -> T;

    fn or_fail<E, F>(self, on_empty: F) -> Result<T, E>
    where
        F: FnOnce() -> E;
}

impl<T> OptionExt<T> for Option<T> {
    fn when<F>(cond: bool, f: F) -> Option<T>
    where
        F: FnOnce() -> T,
    {
        if cond {
            Some(f())
        } else {
            None
        }
    }

    fn or_fail<E, F>(self, on_empty: F) -> Result<T, E>
    where
        F: FnOnce() -> E,
    {
        match self {
            Some(v) => Ok(v),
            None => Err(on_empty()),
        }
    }
}
