/// Assert that some response text starts with the given prefix
#[macro_export]
macro_rules! assert_response_starts_with {
    ($responses:expr, $prefix:expr) => {
        let responses = &$responses;
        assert!(
            responses.iter().any(|text| text.starts_with($prefix)),
            "expected a response starting with {:?}, got {:?}",
            $prefix,
            responses
        );
    };
}

/// Assert that an exact response text was received
#[macro_export]
macro_rules! assert_response {
    ($responses:expr, $text:expr) => {
        let responses = &$responses;
        assert!(
            responses.iter().any(|text| text == $text),
            "expected response {:?}, got {:?}",
            $text,
            responses
        );
    };
}

/// Assert that no response text contains the given fragment
#[macro_export]
macro_rules! assert_no_response_containing {
    ($responses:expr, $fragment:expr) => {
        let responses = &$responses;
        assert!(
            !responses.iter().any(|text| text.contains($fragment)),
            "unexpected response containing {:?} in {:?}",
            $fragment,
            responses
        );
    };
}
