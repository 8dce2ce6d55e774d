mod records_tests;
