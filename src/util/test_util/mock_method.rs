pub type MockClosureSignature<I, R> = Box<dyn FnMut(I) -> R + Send + Sync>;

/// A replaceable implementation of one binding hook, counting its calls.
pub struct MockMethod<I, R> {
    closure: MockClosureSignature<I, R>,
    call_count: usize,
}

impl<I, R> std::default::Default for MockMethod<I, R> {
    fn default() -> Self {
        Self::new_unimplemented()
    }
}

impl<I, R> MockMethod<I, R> {
    pub fn new_unimplemented() -> Self {
        Self::new_fixed(Box::new(|_| unimplemented!()))
    }

    pub fn new_default() -> Self
    where
        R: Default,
    {
        Self::new_fixed(Box::new(|_| R::default()))
    }

    pub fn new_fixed(closure: MockClosureSignature<I, R>) -> Self {
        Self {
            closure,
            call_count: 0,
        }
    }

    pub fn call(&mut self, args: I) -> R {
        self.call_count += 1;
        (self.closure)(args)
    }

    pub fn is_called(&self) -> bool {
        self.call_count > 0
    }

    pub fn call_count(&self) -> usize {
        self.call_count
    }
}
