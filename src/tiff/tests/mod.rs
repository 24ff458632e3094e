mod byte_order_tests;
mod test_utils;
