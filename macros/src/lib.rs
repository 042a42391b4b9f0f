mod utility_macros;
