mod grpc_tests;
