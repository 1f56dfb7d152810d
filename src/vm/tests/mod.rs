// Each test with prefix 'mock_test_' creates its own RC instance over the mock heap. Instances
// are independent, but they share the simulated memory, so every such test runs under
// `with_mockvm`, which serializes them.

mod mock_tests;
