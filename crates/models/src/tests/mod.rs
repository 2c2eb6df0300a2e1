mod entity_tests;
